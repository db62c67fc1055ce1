use time::OffsetDateTime;

use crate::{
	Result,
	db::Db,
	models::{Directory, Subdirectory},
};

const DIRECTORY_COLUMNS: &str =
	"id, name, client_id, description, is_active, created_at, updated_at";
const SUBDIRECTORY_COLUMNS: &str =
	"id, name, directory_id, description, is_active, created_at, updated_at";

pub async fn insert_directory(db: &Db, directory: &Directory) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO directories (id, name, client_id, description, is_active, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(directory.id.as_str())
	.bind(directory.name.as_str())
	.bind(directory.client_id.as_str())
	.bind(directory.description.as_deref())
	.bind(directory.is_active)
	.bind(directory.created_at)
	.bind(directory.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn get_active_directory(db: &Db, directory_id: &str) -> Result<Option<Directory>> {
	let sql =
		format!("SELECT {DIRECTORY_COLUMNS} FROM directories WHERE id = ? AND is_active = 1");
	let directory =
		sqlx::query_as::<_, Directory>(&sql).bind(directory_id).fetch_optional(&db.pool).await?;

	Ok(directory)
}

pub async fn list_directories_by_client(db: &Db, client_id: &str) -> Result<Vec<Directory>> {
	let sql = format!(
		"\
SELECT {DIRECTORY_COLUMNS}
FROM directories
WHERE client_id = ? AND is_active = 1
ORDER BY rowid DESC"
	);
	let directories =
		sqlx::query_as::<_, Directory>(&sql).bind(client_id).fetch_all(&db.pool).await?;

	Ok(directories)
}

pub async fn deactivate_directory(
	db: &Db,
	directory_id: &str,
	now: OffsetDateTime,
) -> Result<bool> {
	let result = sqlx::query(
		"UPDATE directories SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
	)
	.bind(now)
	.bind(directory_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn insert_subdirectory(db: &Db, subdirectory: &Subdirectory) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO subdirectories (id, name, directory_id, description, is_active, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(subdirectory.id.as_str())
	.bind(subdirectory.name.as_str())
	.bind(subdirectory.directory_id.as_str())
	.bind(subdirectory.description.as_deref())
	.bind(subdirectory.is_active)
	.bind(subdirectory.created_at)
	.bind(subdirectory.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn get_active_subdirectory(
	db: &Db,
	subdirectory_id: &str,
) -> Result<Option<Subdirectory>> {
	let sql =
		format!("SELECT {SUBDIRECTORY_COLUMNS} FROM subdirectories WHERE id = ? AND is_active = 1");
	let subdirectory = sqlx::query_as::<_, Subdirectory>(&sql)
		.bind(subdirectory_id)
		.fetch_optional(&db.pool)
		.await?;

	Ok(subdirectory)
}

pub async fn list_subdirectories_by_directory(
	db: &Db,
	directory_id: &str,
) -> Result<Vec<Subdirectory>> {
	let sql = format!(
		"\
SELECT {SUBDIRECTORY_COLUMNS}
FROM subdirectories
WHERE directory_id = ? AND is_active = 1
ORDER BY rowid DESC"
	);
	let subdirectories =
		sqlx::query_as::<_, Subdirectory>(&sql).bind(directory_id).fetch_all(&db.pool).await?;

	Ok(subdirectories)
}
