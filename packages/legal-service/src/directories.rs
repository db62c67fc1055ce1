use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
	ActivityEntry, ActivityKind, Caller, Error, LegalService, Result,
	validate::{self, FieldChecks},
};
use legal_storage::{
	directories, ids,
	models::{Directory, Subdirectory},
};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryView {
	pub id: String,
	pub name: String,
	pub client_id: String,
	pub description: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl From<Directory> for DirectoryView {
	fn from(row: Directory) -> Self {
		Self {
			id: row.id,
			name: row.name,
			client_id: row.client_id,
			description: row.description,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubdirectoryView {
	pub id: String,
	pub name: String,
	pub directory_id: String,
	pub description: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl From<Subdirectory> for SubdirectoryView {
	fn from(row: Subdirectory) -> Self {
		Self {
			id: row.id,
			name: row.name,
			directory_id: row.directory_id,
			description: row.description,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDirectoryRequest {
	pub name: String,
	pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubdirectoryRequest {
	pub name: String,
	pub description: Option<String>,
}

impl LegalService {
	pub async fn create_directory(
		&self,
		caller: &Caller,
		client_id: &str,
		req: CreateDirectoryRequest,
	) -> Result<DirectoryView> {
		let mut checks = FieldChecks::new();

		checks.chars_between("name", &req.name, 1, 100, "Name must be 1 to 100 characters");
		checks.finish()?;

		let client = self.owned_client(caller, client_id).await?;
		let now = OffsetDateTime::now_utc();
		let directory = Directory {
			id: ids::new_id(ids::DIRECTORY),
			name: req.name.trim().to_string(),
			client_id: client.id,
			description: validate::clean(req.description),
			is_active: true,
			created_at: now,
			updated_at: now,
		};

		directories::insert_directory(&self.db, &directory).await?;

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::Document,
				"directory_created",
				format!("Created directory {}", directory.name),
				&caller.user_id,
			)
			.client(Some(&directory.client_id)),
		);

		Ok(directory.into())
	}

	pub async fn list_directories(
		&self,
		caller: &Caller,
		client_id: &str,
	) -> Result<Vec<DirectoryView>> {
		let client = self.owned_client(caller, client_id).await?;
		let rows = directories::list_directories_by_client(&self.db, &client.id).await?;

		Ok(rows.into_iter().map(DirectoryView::from).collect())
	}

	pub async fn delete_directory(&self, caller: &Caller, directory_id: &str) -> Result<()> {
		let directory = self.owned_directory(caller, directory_id).await?;

		if !directories::deactivate_directory(&self.db, &directory.id, OffsetDateTime::now_utc())
			.await?
		{
			return Err(Error::not_found("Directory"));
		}

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::Document,
				"directory_deleted",
				format!("Deleted directory {}", directory.name),
				&caller.user_id,
			)
			.client(Some(&directory.client_id)),
		);

		Ok(())
	}

	pub async fn create_subdirectory(
		&self,
		caller: &Caller,
		directory_id: &str,
		req: CreateSubdirectoryRequest,
	) -> Result<SubdirectoryView> {
		let mut checks = FieldChecks::new();

		checks.chars_between("name", &req.name, 1, 100, "Name must be 1 to 100 characters");
		checks.finish()?;

		let directory = self.owned_directory(caller, directory_id).await?;
		let now = OffsetDateTime::now_utc();
		let subdirectory = Subdirectory {
			id: ids::new_id(ids::SUBDIRECTORY),
			name: req.name.trim().to_string(),
			directory_id: directory.id,
			description: validate::clean(req.description),
			is_active: true,
			created_at: now,
			updated_at: now,
		};

		directories::insert_subdirectory(&self.db, &subdirectory).await?;

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::Document,
				"subdirectory_created",
				format!("Created subdirectory {}", subdirectory.name),
				&caller.user_id,
			)
			.client(Some(&directory.client_id)),
		);

		Ok(subdirectory.into())
	}

	pub async fn list_subdirectories(
		&self,
		caller: &Caller,
		directory_id: &str,
	) -> Result<Vec<SubdirectoryView>> {
		let directory = self.owned_directory(caller, directory_id).await?;
		let rows = directories::list_subdirectories_by_directory(&self.db, &directory.id).await?;

		Ok(rows.into_iter().map(SubdirectoryView::from).collect())
	}

	/// A directory is reachable only through an active client the caller owns.
	pub(crate) async fn owned_directory(
		&self,
		caller: &Caller,
		directory_id: &str,
	) -> Result<Directory> {
		let directory = directories::get_active_directory(&self.db, directory_id)
			.await?
			.ok_or_else(|| Error::not_found("Directory"))?;

		self.owned_client(caller, &directory.client_id).await?;

		Ok(directory)
	}
}
