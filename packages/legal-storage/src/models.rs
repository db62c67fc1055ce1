use serde_json::Value;
use sqlx::types::Json;
use time::OffsetDateTime;

/// Limit/offset window for list queries.
#[derive(Clone, Copy, Debug)]
pub struct Page {
	pub limit: i64,
	pub offset: i64,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
	pub id: String,
	pub name: String,
	pub email: String,
	pub password: Option<String>,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub image: Option<String>,
	pub provider: Option<String>,
	pub role: String,
	pub is_active: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Client {
	pub id: String,
	pub name: String,
	pub email: Option<String>,
	pub phone: String,
	pub address: Option<String>,
	pub reference_id: Option<String>,
	pub user_id: String,
	pub is_active: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Directory {
	pub id: String,
	pub name: String,
	pub client_id: String,
	pub description: Option<String>,
	pub is_active: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Subdirectory {
	pub id: String,
	pub name: String,
	pub directory_id: String,
	pub description: Option<String>,
	pub is_active: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ResearchQuery {
	pub id: String,
	pub user_id: Option<String>,
	pub client_id: Option<String>,
	pub query_text: String,
	pub response_text: String,
	pub status: String,
	pub model: String,
	pub confidence: Option<f64>,
	pub tags: Option<Json<Vec<String>>>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Document {
	pub id: String,
	pub name: String,
	pub r#type: String,
	pub size: i64,
	pub path: String,
	pub client_id: Option<String>,
	pub directory_id: Option<String>,
	pub subdirectory_id: Option<String>,
	pub uploaded_by: String,
	pub is_active: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Case {
	pub id: String,
	pub title: String,
	pub description: Option<String>,
	pub case_number: Option<String>,
	pub court: Option<String>,
	pub status: String,
	pub priority: String,
	pub client_id: String,
	pub assigned_to: String,
	pub start_date: OffsetDateTime,
	pub end_date: Option<OffsetDateTime>,
	pub tags: Option<Json<Vec<String>>>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Setting {
	pub key: String,
	pub value: String,
	pub description: Option<String>,
	pub category: String,
	pub is_public: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Activity {
	pub id: String,
	pub r#type: String,
	pub action: String,
	pub description: String,
	pub user_id: String,
	pub client_id: Option<String>,
	pub case_id: Option<String>,
	pub metadata: Option<Json<Value>>,
	pub created_at: OffsetDateTime,
}
