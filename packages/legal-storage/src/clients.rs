use time::OffsetDateTime;

use crate::{
	Result,
	db::Db,
	models::{Client, Page},
};

const CLIENT_COLUMNS: &str = "\
id, name, email, phone, address, reference_id, user_id, is_active, created_at, updated_at";

pub async fn insert_client(db: &Db, client: &Client) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO clients (
	id,
	name,
	email,
	phone,
	address,
	reference_id,
	user_id,
	is_active,
	created_at,
	updated_at
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(client.id.as_str())
	.bind(client.name.as_str())
	.bind(client.email.as_deref())
	.bind(client.phone.as_str())
	.bind(client.address.as_deref())
	.bind(client.reference_id.as_deref())
	.bind(client.user_id.as_str())
	.bind(client.is_active)
	.bind(client.created_at)
	.bind(client.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn get_active_client(db: &Db, client_id: &str) -> Result<Option<Client>> {
	let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ? AND is_active = 1");
	let client = sqlx::query_as::<_, Client>(&sql).bind(client_id).fetch_optional(&db.pool).await?;

	Ok(client)
}

/// Active clients of one owner, newest first, plus the total active count.
///
/// Rows are never hard-deleted, so `rowid` order is insertion order. RFC 3339 text with trimmed
/// fractional seconds does not sort lexically.
pub async fn list_clients_by_owner(
	db: &Db,
	user_id: &str,
	page: Page,
) -> Result<(Vec<Client>, i64)> {
	let sql = format!(
		"\
SELECT {CLIENT_COLUMNS}
FROM clients
WHERE user_id = ? AND is_active = 1
ORDER BY rowid DESC
LIMIT ? OFFSET ?"
	);
	let clients = sqlx::query_as::<_, Client>(&sql)
		.bind(user_id)
		.bind(page.limit)
		.bind(page.offset)
		.fetch_all(&db.pool)
		.await?;
	let total: i64 =
		sqlx::query_scalar("SELECT count(*) FROM clients WHERE user_id = ? AND is_active = 1")
			.bind(user_id)
			.fetch_one(&db.pool)
			.await?;

	Ok((clients, total))
}

pub async fn update_client(db: &Db, client: &Client) -> Result<bool> {
	let result = sqlx::query(
		"\
UPDATE clients
SET
	name = ?,
	email = ?,
	phone = ?,
	address = ?,
	reference_id = ?,
	updated_at = ?
WHERE id = ? AND is_active = 1",
	)
	.bind(client.name.as_str())
	.bind(client.email.as_deref())
	.bind(client.phone.as_str())
	.bind(client.address.as_deref())
	.bind(client.reference_id.as_deref())
	.bind(client.updated_at)
	.bind(client.id.as_str())
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() > 0)
}

/// Soft delete. Rows referencing the client keep their `client_id`.
pub async fn deactivate_client(db: &Db, client_id: &str, now: OffsetDateTime) -> Result<bool> {
	let result = sqlx::query(
		"UPDATE clients SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
	)
	.bind(now)
	.bind(client_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() > 0)
}
