use crate::{
	Result,
	db::Db,
	models::{Case, Page},
};

const CASE_COLUMNS: &str = "\
id, title, description, case_number, court, status, priority, client_id, assigned_to, start_date, \
end_date, tags, created_at, updated_at";

pub async fn insert_case(db: &Db, case: &Case) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO cases (
	id,
	title,
	description,
	case_number,
	court,
	status,
	priority,
	client_id,
	assigned_to,
	start_date,
	end_date,
	tags,
	created_at,
	updated_at
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(case.id.as_str())
	.bind(case.title.as_str())
	.bind(case.description.as_deref())
	.bind(case.case_number.as_deref())
	.bind(case.court.as_deref())
	.bind(case.status.as_str())
	.bind(case.priority.as_str())
	.bind(case.client_id.as_str())
	.bind(case.assigned_to.as_str())
	.bind(case.start_date)
	.bind(case.end_date)
	.bind(&case.tags)
	.bind(case.created_at)
	.bind(case.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn get_case(db: &Db, case_id: &str) -> Result<Option<Case>> {
	let sql = format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?");
	let case = sqlx::query_as::<_, Case>(&sql).bind(case_id).fetch_optional(&db.pool).await?;

	Ok(case)
}

pub async fn list_cases_by_assignee(
	db: &Db,
	user_id: &str,
	page: Page,
) -> Result<(Vec<Case>, i64)> {
	let sql = format!(
		"\
SELECT {CASE_COLUMNS}
FROM cases
WHERE assigned_to = ?
ORDER BY rowid DESC
LIMIT ? OFFSET ?"
	);
	let cases = sqlx::query_as::<_, Case>(&sql)
		.bind(user_id)
		.bind(page.limit)
		.bind(page.offset)
		.fetch_all(&db.pool)
		.await?;
	let total: i64 = sqlx::query_scalar("SELECT count(*) FROM cases WHERE assigned_to = ?")
		.bind(user_id)
		.fetch_one(&db.pool)
		.await?;

	Ok((cases, total))
}

pub async fn update_case(db: &Db, case: &Case) -> Result<bool> {
	let result = sqlx::query(
		"\
UPDATE cases
SET
	title = ?,
	description = ?,
	case_number = ?,
	court = ?,
	status = ?,
	priority = ?,
	end_date = ?,
	tags = ?,
	updated_at = ?
WHERE id = ?",
	)
	.bind(case.title.as_str())
	.bind(case.description.as_deref())
	.bind(case.case_number.as_deref())
	.bind(case.court.as_deref())
	.bind(case.status.as_str())
	.bind(case.priority.as_str())
	.bind(case.end_date)
	.bind(&case.tags)
	.bind(case.updated_at)
	.bind(case.id.as_str())
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() > 0)
}
