use time::OffsetDateTime;

use crate::{
	Result,
	db::Db,
	models::{Document, Page},
};

const DOCUMENT_COLUMNS: &str = "\
id, name, type, size, path, client_id, directory_id, subdirectory_id, uploaded_by, is_active, \
created_at, updated_at";

pub async fn insert_document(db: &Db, document: &Document) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO documents (
	id,
	name,
	type,
	size,
	path,
	client_id,
	directory_id,
	subdirectory_id,
	uploaded_by,
	is_active,
	created_at,
	updated_at
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(document.id.as_str())
	.bind(document.name.as_str())
	.bind(document.r#type.as_str())
	.bind(document.size)
	.bind(document.path.as_str())
	.bind(document.client_id.as_deref())
	.bind(document.directory_id.as_deref())
	.bind(document.subdirectory_id.as_deref())
	.bind(document.uploaded_by.as_str())
	.bind(document.is_active)
	.bind(document.created_at)
	.bind(document.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn get_active_document(db: &Db, document_id: &str) -> Result<Option<Document>> {
	let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ? AND is_active = 1");
	let document =
		sqlx::query_as::<_, Document>(&sql).bind(document_id).fetch_optional(&db.pool).await?;

	Ok(document)
}

pub async fn list_documents_by_client(
	db: &Db,
	client_id: &str,
	page: Page,
) -> Result<(Vec<Document>, i64)> {
	let sql = format!(
		"\
SELECT {DOCUMENT_COLUMNS}
FROM documents
WHERE client_id = ? AND is_active = 1
ORDER BY rowid DESC
LIMIT ? OFFSET ?"
	);
	let documents = sqlx::query_as::<_, Document>(&sql)
		.bind(client_id)
		.bind(page.limit)
		.bind(page.offset)
		.fetch_all(&db.pool)
		.await?;
	let total: i64 =
		sqlx::query_scalar("SELECT count(*) FROM documents WHERE client_id = ? AND is_active = 1")
			.bind(client_id)
			.fetch_one(&db.pool)
			.await?;

	Ok((documents, total))
}

pub async fn deactivate_document(
	db: &Db,
	document_id: &str,
	now: OffsetDateTime,
) -> Result<bool> {
	let result = sqlx::query(
		"UPDATE documents SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
	)
	.bind(now)
	.bind(document_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() > 0)
}
