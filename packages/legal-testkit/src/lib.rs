mod error;

pub use error::{Error, Result};

use std::{
	env, fs, io,
	path::{Path, PathBuf},
};

use uuid::Uuid;

const SIDECAR_SUFFIXES: [&str; 3] = ["", "-wal", "-shm"];

/// A throwaway on-disk SQLite database. Its files are removed on `cleanup` or drop.
pub struct TestDatabase {
	name: String,
	dir: PathBuf,
	path: PathBuf,
	cleaned: bool,
}
impl TestDatabase {
	pub fn new() -> Result<Self> {
		let name = format!("legal_test_{}", Uuid::new_v4().simple());
		let dir = env::temp_dir().join(&name);

		fs::create_dir_all(&dir).map_err(|err| {
			Error::Message(format!("Failed to create test database directory {dir:?}: {err}."))
		})?;

		let path = dir.join("legal.db");

		Ok(Self { name, dir, path, cleaned: false })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Database path as a string, ready for `storage.sqlite.path`.
	pub fn path_str(&self) -> String {
		self.path.to_string_lossy().into_owned()
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		remove_database_files(&self.dir, &self.path)?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}
		if let Err(err) = remove_database_files(&self.dir, &self.path) {
			eprintln!("Test database cleanup failed: {err}.");
		}
	}
}

fn remove_database_files(dir: &Path, path: &Path) -> Result<()> {
	for suffix in SIDECAR_SUFFIXES {
		let mut file = path.as_os_str().to_owned();

		file.push(suffix);

		match fs::remove_file(&file) {
			Ok(()) => {},
			Err(err) if err.kind() == io::ErrorKind::NotFound => {},
			Err(err) => return Err(err.into()),
		}
	}

	match fs::remove_dir(dir) {
		Ok(()) => Ok(()),
		Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
		Err(err) => Err(err.into()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cleanup_removes_database_and_sidecars() {
		let db = TestDatabase::new().expect("Failed to create test database.");
		let path = db.path().to_path_buf();
		let wal = PathBuf::from(format!("{}-wal", path.display()));

		fs::write(&path, b"").expect("Failed to write database file.");
		fs::write(&wal, b"").expect("Failed to write wal file.");

		db.cleanup().expect("Failed to clean up test database.");

		assert!(!path.exists());
		assert!(!wal.exists());
	}

	#[test]
	fn drop_removes_directory() {
		let dir = {
			let db = TestDatabase::new().expect("Failed to create test database.");

			fs::write(db.path(), b"").expect("Failed to write database file.");

			db.path().parent().map(Path::to_path_buf).expect("Database path has a parent.")
		};

		assert!(!dir.exists());
	}
}
