use crate::{
	Result,
	db::Db,
	models::{Page, ResearchQuery},
};

const RESEARCH_COLUMNS: &str = "\
id, user_id, client_id, query_text, response_text, status, model, confidence, tags, created_at, \
updated_at";

pub async fn insert_research_query(db: &Db, query: &ResearchQuery) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO research_queries (
	id,
	user_id,
	client_id,
	query_text,
	response_text,
	status,
	model,
	confidence,
	tags,
	created_at,
	updated_at
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(query.id.as_str())
	.bind(query.user_id.as_deref())
	.bind(query.client_id.as_deref())
	.bind(query.query_text.as_str())
	.bind(query.response_text.as_str())
	.bind(query.status.as_str())
	.bind(query.model.as_str())
	.bind(query.confidence)
	.bind(&query.tags)
	.bind(query.created_at)
	.bind(query.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn get_research_query(db: &Db, query_id: &str) -> Result<Option<ResearchQuery>> {
	let sql = format!("SELECT {RESEARCH_COLUMNS} FROM research_queries WHERE id = ?");
	let query =
		sqlx::query_as::<_, ResearchQuery>(&sql).bind(query_id).fetch_optional(&db.pool).await?;

	Ok(query)
}

pub async fn list_research_by_user(
	db: &Db,
	user_id: &str,
	page: Page,
) -> Result<(Vec<ResearchQuery>, i64)> {
	list_research_where(db, "user_id", user_id, page).await
}

pub async fn list_research_by_client(
	db: &Db,
	client_id: &str,
	page: Page,
) -> Result<(Vec<ResearchQuery>, i64)> {
	list_research_where(db, "client_id", client_id, page).await
}

async fn list_research_where(
	db: &Db,
	column: &'static str,
	value: &str,
	page: Page,
) -> Result<(Vec<ResearchQuery>, i64)> {
	let sql = format!(
		"\
SELECT {RESEARCH_COLUMNS}
FROM research_queries
WHERE {column} = ?
ORDER BY rowid DESC
LIMIT ? OFFSET ?"
	);
	let queries = sqlx::query_as::<_, ResearchQuery>(&sql)
		.bind(value)
		.bind(page.limit)
		.bind(page.offset)
		.fetch_all(&db.pool)
		.await?;
	let count_sql = format!("SELECT count(*) FROM research_queries WHERE {column} = ?");
	let total: i64 = sqlx::query_scalar(&count_sql).bind(value).fetch_one(&db.pool).await?;

	Ok((queries, total))
}
