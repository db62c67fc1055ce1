use crate::{
	Result,
	db::Db,
	models::{Activity, Page},
};

pub async fn insert_activity(db: &Db, activity: &Activity) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO activities (
	id,
	type,
	action,
	description,
	user_id,
	client_id,
	case_id,
	metadata,
	created_at
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(activity.id.as_str())
	.bind(activity.r#type.as_str())
	.bind(activity.action.as_str())
	.bind(activity.description.as_str())
	.bind(activity.user_id.as_str())
	.bind(activity.client_id.as_deref())
	.bind(activity.case_id.as_deref())
	.bind(&activity.metadata)
	.bind(activity.created_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn list_activities_by_user(
	db: &Db,
	user_id: &str,
	page: Page,
) -> Result<(Vec<Activity>, i64)> {
	let activities = sqlx::query_as::<_, Activity>(
		"\
SELECT id, type, action, description, user_id, client_id, case_id, metadata, created_at
FROM activities
WHERE user_id = ?
ORDER BY rowid DESC
LIMIT ? OFFSET ?",
	)
	.bind(user_id)
	.bind(page.limit)
	.bind(page.offset)
	.fetch_all(&db.pool)
	.await?;
	let total: i64 = sqlx::query_scalar("SELECT count(*) FROM activities WHERE user_id = ?")
		.bind(user_id)
		.fetch_one(&db.pool)
		.await?;

	Ok((activities, total))
}
