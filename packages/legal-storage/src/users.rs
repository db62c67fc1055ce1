use time::OffsetDateTime;

use crate::{Result, db::Db, error, models::User};

const USER_COLUMNS: &str = "\
id, name, email, password, phone, address, image, provider, role, is_active, created_at, updated_at";

pub async fn insert_user(db: &Db, user: &User) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO users (
	id,
	name,
	email,
	password,
	phone,
	address,
	image,
	provider,
	role,
	is_active,
	created_at,
	updated_at
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(user.id.as_str())
	.bind(user.name.as_str())
	.bind(user.email.as_str())
	.bind(user.password.as_deref())
	.bind(user.phone.as_deref())
	.bind(user.address.as_deref())
	.bind(user.image.as_deref())
	.bind(user.provider.as_deref())
	.bind(user.role.as_str())
	.bind(user.is_active)
	.bind(user.created_at)
	.bind(user.updated_at)
	.execute(&db.pool)
	.await
	.map_err(|err| error::unique_as_conflict(err, "A user with this email already exists."))?;

	Ok(())
}

/// Inserts the user or refreshes its identity columns, reactivating it if it was soft-deleted.
pub async fn upsert_user_identity(db: &Db, user: &User) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO users (id, name, email, role, is_active, created_at, updated_at)
VALUES (?, ?, ?, ?, 1, ?, ?)
ON CONFLICT (id) DO UPDATE
SET
	name = excluded.name,
	email = excluded.email,
	role = excluded.role,
	is_active = 1,
	updated_at = excluded.updated_at",
	)
	.bind(user.id.as_str())
	.bind(user.name.as_str())
	.bind(user.email.as_str())
	.bind(user.role.as_str())
	.bind(user.created_at)
	.bind(user.updated_at)
	.execute(&db.pool)
	.await
	.map_err(|err| error::unique_as_conflict(err, "A user with this email already exists."))?;

	Ok(())
}

pub async fn get_active_user(db: &Db, user_id: &str) -> Result<Option<User>> {
	let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? AND is_active = 1");
	let user = sqlx::query_as::<_, User>(&sql).bind(user_id).fetch_optional(&db.pool).await?;

	Ok(user)
}

/// Writes the profile columns of an existing active user. Returns false when no row matched.
pub async fn update_user_profile(db: &Db, user: &User) -> Result<bool> {
	let result = sqlx::query(
		"\
UPDATE users
SET
	name = ?,
	phone = ?,
	address = ?,
	image = ?,
	updated_at = ?
WHERE id = ? AND is_active = 1",
	)
	.bind(user.name.as_str())
	.bind(user.phone.as_deref())
	.bind(user.address.as_deref())
	.bind(user.image.as_deref())
	.bind(user.updated_at)
	.bind(user.id.as_str())
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn deactivate_user(db: &Db, user_id: &str, now: OffsetDateTime) -> Result<bool> {
	let result =
		sqlx::query("UPDATE users SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
			.bind(now)
			.bind(user_id)
			.execute(&db.pool)
			.await?;

	Ok(result.rows_affected() > 0)
}
