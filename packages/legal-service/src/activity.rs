use serde::Serialize;
use serde_json::Value;
use sqlx::types::Json;
use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::{Caller, LegalService, PageRequest, Paged, Result};
use legal_storage::{activities, db::Db, ids, models::Activity};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
	Research,
	Document,
	Case,
	Client,
	System,
}
impl ActivityKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Research => "research",
			Self::Document => "document",
			Self::Case => "case",
			Self::Client => "client",
			Self::System => "system",
		}
	}
}

#[derive(Clone, Debug)]
pub struct ActivityEntry {
	pub kind: ActivityKind,
	pub action: String,
	pub description: String,
	pub user_id: String,
	pub client_id: Option<String>,
	pub case_id: Option<String>,
	pub metadata: Option<Value>,
}
impl ActivityEntry {
	pub fn new(
		kind: ActivityKind,
		action: &str,
		description: impl Into<String>,
		user_id: &str,
	) -> Self {
		Self {
			kind,
			action: action.to_string(),
			description: description.into(),
			user_id: user_id.to_string(),
			client_id: None,
			case_id: None,
			metadata: None,
		}
	}

	pub fn client(mut self, client_id: Option<&str>) -> Self {
		self.client_id = client_id.map(str::to_string);

		self
	}

	pub fn case(mut self, case_id: Option<&str>) -> Self {
		self.case_id = case_id.map(str::to_string);

		self
	}

	pub fn metadata(mut self, metadata: Value) -> Self {
		self.metadata = Some(metadata);

		self
	}
}

/// Best-effort audit log. At most one insert per entry; failures are logged, never returned.
#[derive(Clone, Debug)]
pub struct ActivityLog {
	db: Db,
}
impl ActivityLog {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	/// Spawns the insert and returns immediately.
	pub fn emit(&self, entry: ActivityEntry) -> JoinHandle<()> {
		let db = self.db.clone();

		tokio::spawn(async move { write(&db, entry).await })
	}

	/// Same as `emit` but waits for the insert to finish.
	pub async fn record(&self, entry: ActivityEntry) {
		write(&self.db, entry).await;
	}
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
	pub id: String,
	#[serde(rename = "type")]
	pub activity_type: String,
	pub action: String,
	pub description: String,
	pub user_id: String,
	pub client_id: Option<String>,
	pub case_id: Option<String>,
	pub metadata: Option<Value>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl From<Activity> for ActivityView {
	fn from(row: Activity) -> Self {
		Self {
			id: row.id,
			activity_type: row.r#type,
			action: row.action,
			description: row.description,
			user_id: row.user_id,
			client_id: row.client_id,
			case_id: row.case_id,
			metadata: row.metadata.map(|json| json.0),
			created_at: row.created_at,
		}
	}
}

impl LegalService {
	pub async fn list_activities(
		&self,
		caller: &Caller,
		page: PageRequest,
	) -> Result<Paged<ActivityView>> {
		let pagination = self.paginate(page).await?;
		let (rows, total) =
			activities::list_activities_by_user(&self.db, &caller.user_id, pagination.window())
				.await?;

		Ok(pagination.paged(rows, total))
	}
}

async fn write(db: &Db, entry: ActivityEntry) {
	let activity = Activity {
		id: ids::new_id(ids::ACTIVITY),
		r#type: entry.kind.as_str().to_string(),
		action: entry.action,
		description: entry.description,
		user_id: entry.user_id,
		client_id: entry.client_id,
		case_id: entry.case_id,
		metadata: entry.metadata.filter(Value::is_object).map(Json),
		created_at: OffsetDateTime::now_utc(),
	};

	if let Err(err) = activities::insert_activity(db, &activity).await {
		tracing::warn!(
			error = %err,
			user_id = %activity.user_id,
			action = %activity.action,
			"Failed to record activity."
		);
	}
}
