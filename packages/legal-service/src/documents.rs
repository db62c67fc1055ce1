use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use crate::{
	ActivityEntry, ActivityKind, Caller, Error, LegalService, PageRequest, Paged, Result,
	validate::{self, FieldChecks},
};
use legal_storage::{directories, documents, ids, models::Document};

const DOCUMENT_TYPES: &[&str] = &["pdf", "doc", "docx", "txt", "image"];
const DEFAULT_MAX_FILE_SIZE: i64 = 10 * 1024 * 1024;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "pdf,doc,docx,txt,jpg,jpeg,png";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
	pub id: String,
	pub name: String,
	#[serde(rename = "type")]
	pub document_type: String,
	pub size: i64,
	pub path: String,
	pub client_id: Option<String>,
	pub directory_id: Option<String>,
	pub subdirectory_id: Option<String>,
	pub uploaded_by: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl From<Document> for DocumentView {
	fn from(row: Document) -> Self {
		Self {
			id: row.id,
			name: row.name,
			document_type: row.r#type,
			size: row.size,
			path: row.path,
			client_id: row.client_id,
			directory_id: row.directory_id,
			subdirectory_id: row.subdirectory_id,
			uploaded_by: row.uploaded_by,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

/// Metadata for a file already stored elsewhere. The file bytes never pass through this service.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDocumentRequest {
	pub name: String,
	#[serde(rename = "type")]
	pub document_type: String,
	pub size: i64,
	pub path: String,
	pub client_id: Option<String>,
	pub directory_id: Option<String>,
	pub subdirectory_id: Option<String>,
}

impl LegalService {
	pub async fn register_document(
		&self,
		caller: &Caller,
		req: RegisterDocumentRequest,
	) -> Result<DocumentView> {
		let max_size = self.int_setting("MAX_FILE_SIZE", 1..=i64::MAX, DEFAULT_MAX_FILE_SIZE).await;
		let allowed = self
			.setting_value("ALLOWED_FILE_TYPES")
			.await
			.unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.to_string());
		let mut checks = FieldChecks::new();

		checks.chars_between("name", &req.name, 1, 255, "Name must be 1 to 255 characters");
		checks.min_chars("path", &req.path, 1, "Path is required");
		checks.one_of("type", Some(req.document_type.as_str()), DOCUMENT_TYPES);
		checks.check(
			extension_allowed(&req.name, &allowed),
			"name",
			&format!("File extension must be one of {allowed}"),
		);
		checks.check(req.size >= 0, "size", "Size must not be negative");
		checks.check(
			req.size <= max_size,
			"size",
			&format!("File exceeds the maximum size of {max_size} bytes"),
		);
		checks.finish()?;

		let client_id = validate::clean(req.client_id);
		let directory_id = validate::clean(req.directory_id);
		let subdirectory_id = validate::clean(req.subdirectory_id);

		if let Some(client_id) = client_id.as_deref() {
			self.owned_client(caller, client_id).await?;
		}
		if let Some(directory_id) = directory_id.as_deref() {
			self.owned_directory(caller, directory_id).await?;
		}
		if let Some(subdirectory_id) = subdirectory_id.as_deref() {
			let subdirectory = directories::get_active_subdirectory(&self.db, subdirectory_id)
				.await?
				.ok_or_else(|| Error::not_found("Subdirectory"))?;

			self.owned_directory(caller, &subdirectory.directory_id).await?;
		}

		let now = OffsetDateTime::now_utc();
		let document = Document {
			id: ids::new_id(ids::DOCUMENT),
			name: req.name.trim().to_string(),
			r#type: req.document_type,
			size: req.size,
			path: req.path.trim().to_string(),
			client_id,
			directory_id,
			subdirectory_id,
			uploaded_by: caller.user_id.clone(),
			is_active: true,
			created_at: now,
			updated_at: now,
		};

		documents::insert_document(&self.db, &document).await?;

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::Document,
				"uploaded",
				format!("Registered document {}", document.name),
				&caller.user_id,
			)
			.client(document.client_id.as_deref())
			.metadata(json!({ "type": document.r#type, "size": document.size })),
		);

		Ok(document.into())
	}

	pub async fn list_client_documents(
		&self,
		caller: &Caller,
		client_id: &str,
		page: PageRequest,
	) -> Result<Paged<DocumentView>> {
		let pagination = self.paginate(page).await?;
		let client = self.owned_client(caller, client_id).await?;
		let (rows, total) =
			documents::list_documents_by_client(&self.db, &client.id, pagination.window()).await?;

		Ok(pagination.paged(rows, total))
	}

	pub async fn delete_document(&self, caller: &Caller, document_id: &str) -> Result<()> {
		let document = documents::get_active_document(&self.db, document_id)
			.await?
			.ok_or_else(|| Error::not_found("Document"))?;

		crate::ensure_owner(caller, &document.uploaded_by, "Document")?;

		if !documents::deactivate_document(&self.db, &document.id, OffsetDateTime::now_utc()).await?
		{
			return Err(Error::not_found("Document"));
		}

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::Document,
				"deleted",
				format!("Deleted document {}", document.name),
				&caller.user_id,
			)
			.client(document.client_id.as_deref()),
		);

		Ok(())
	}
}

/// Names without an extension pass; otherwise the extension must appear in the comma list.
fn extension_allowed(name: &str, allowed: &str) -> bool {
	let Some((_, extension)) = name.trim().rsplit_once('.') else {
		return true;
	};

	allowed.split(',').any(|candidate| candidate.trim().eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extension_check_is_case_insensitive() {
		assert!(extension_allowed("Plaint.PDF", DEFAULT_ALLOWED_EXTENSIONS));
		assert!(extension_allowed("affidavit", DEFAULT_ALLOWED_EXTENSIONS));
		assert!(extension_allowed("scan.png", "pdf, png"));
		assert!(!extension_allowed("payload.exe", DEFAULT_ALLOWED_EXTENSIONS));
	}
}
