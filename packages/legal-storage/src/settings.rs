use crate::{Result, db::Db, models::Setting};

const SETTING_COLUMNS: &str =
	"key, value, description, category, is_public, created_at, updated_at";

pub async fn get_setting(db: &Db, key: &str) -> Result<Option<Setting>> {
	let sql = format!("SELECT {SETTING_COLUMNS} FROM settings WHERE key = ?");
	let setting = sqlx::query_as::<_, Setting>(&sql).bind(key).fetch_optional(&db.pool).await?;

	Ok(setting)
}

pub async fn get_setting_value(db: &Db, key: &str) -> Result<Option<String>> {
	let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
		.bind(key)
		.fetch_optional(&db.pool)
		.await?;

	Ok(value)
}

/// Inserts or replaces every column except `created_at`.
pub async fn upsert_setting(db: &Db, setting: &Setting) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO settings (key, value, description, category, is_public, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
ON CONFLICT (key) DO UPDATE
SET
	value = excluded.value,
	description = excluded.description,
	category = excluded.category,
	is_public = excluded.is_public,
	updated_at = excluded.updated_at",
	)
	.bind(setting.key.as_str())
	.bind(setting.value.as_str())
	.bind(setting.description.as_deref())
	.bind(setting.category.as_str())
	.bind(setting.is_public)
	.bind(setting.created_at)
	.bind(setting.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn list_settings(db: &Db) -> Result<Vec<Setting>> {
	let sql = format!("SELECT {SETTING_COLUMNS} FROM settings ORDER BY category, key");
	let settings = sqlx::query_as::<_, Setting>(&sql).fetch_all(&db.pool).await?;

	Ok(settings)
}

pub async fn list_public_settings(db: &Db) -> Result<Vec<Setting>> {
	let sql =
		format!("SELECT {SETTING_COLUMNS} FROM settings WHERE is_public = 1 ORDER BY category, key");
	let settings = sqlx::query_as::<_, Setting>(&sql).fetch_all(&db.pool).await?;

	Ok(settings)
}
