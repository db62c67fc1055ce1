use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::types::Json;
use time::OffsetDateTime;

use crate::{
	ActivityEntry, ActivityKind, Caller, Error, LegalService, PageRequest, Paged, Result,
	validate::{self, FieldChecks},
};
use legal_storage::{cases, ids, models::Case};

const STATUSES: &[&str] = &["active", "closed", "pending"];
const PRIORITIES: &[&str] = &["low", "medium", "high", "urgent"];

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseView {
	pub id: String,
	pub title: String,
	pub description: Option<String>,
	pub case_number: Option<String>,
	pub court: Option<String>,
	pub status: String,
	pub priority: String,
	pub client_id: String,
	pub assigned_to: String,
	#[serde(with = "crate::time_serde")]
	pub start_date: OffsetDateTime,
	#[serde(with = "crate::time_serde::option")]
	pub end_date: Option<OffsetDateTime>,
	pub tags: Vec<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl From<Case> for CaseView {
	fn from(row: Case) -> Self {
		Self {
			id: row.id,
			title: row.title,
			description: row.description,
			case_number: row.case_number,
			court: row.court,
			status: row.status,
			priority: row.priority,
			client_id: row.client_id,
			assigned_to: row.assigned_to,
			start_date: row.start_date,
			end_date: row.end_date,
			tags: row.tags.map(|tags| tags.0).unwrap_or_default(),
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
	pub title: String,
	pub client_id: String,
	pub start_date: String,
	pub description: Option<String>,
	pub case_number: Option<String>,
	pub court: Option<String>,
	pub status: Option<String>,
	pub priority: Option<String>,
	pub end_date: Option<String>,
	pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaseRequest {
	pub title: Option<String>,
	pub description: Option<String>,
	pub case_number: Option<String>,
	pub court: Option<String>,
	pub status: Option<String>,
	pub priority: Option<String>,
	pub end_date: Option<String>,
	pub tags: Option<Vec<String>>,
}

impl LegalService {
	pub async fn create_case(&self, caller: &Caller, req: CreateCaseRequest) -> Result<CaseView> {
		let mut checks = FieldChecks::new();

		checks.chars_between("title", &req.title, 1, 200, "Title must be 1 to 200 characters");
		checks.one_of("status", req.status.as_deref(), STATUSES);
		checks.one_of("priority", req.priority.as_deref(), PRIORITIES);

		let start_date = checks.timestamp("startDate", Some(&req.start_date));
		let end_date = checks.timestamp("endDate", req.end_date.as_deref());

		checks.finish()?;

		let Some(start_date) = start_date else {
			return Err(Error::validation("startDate", "Invalid date format"));
		};
		let client = self.owned_client(caller, &req.client_id).await?;
		let now = OffsetDateTime::now_utc();
		let case = Case {
			id: ids::new_id(ids::CASE),
			title: req.title.trim().to_string(),
			description: validate::clean(req.description),
			case_number: validate::clean(req.case_number),
			court: validate::clean(req.court),
			status: req.status.unwrap_or_else(|| "active".to_string()),
			priority: req.priority.unwrap_or_else(|| "medium".to_string()),
			client_id: client.id,
			assigned_to: caller.user_id.clone(),
			start_date,
			end_date,
			tags: validate::clean_tags(req.tags).map(Json),
			created_at: now,
			updated_at: now,
		};

		cases::insert_case(&self.db, &case).await?;

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::Case,
				"created",
				format!("Opened case {}", case.title),
				&caller.user_id,
			)
			.client(Some(&case.client_id))
			.case(Some(&case.id)),
		);

		Ok(case.into())
	}

	pub async fn list_cases(&self, caller: &Caller, page: PageRequest) -> Result<Paged<CaseView>> {
		let pagination = self.paginate(page).await?;
		let (rows, total) =
			cases::list_cases_by_assignee(&self.db, &caller.user_id, pagination.window()).await?;

		Ok(pagination.paged(rows, total))
	}

	pub async fn get_case(&self, caller: &Caller, case_id: &str) -> Result<CaseView> {
		Ok(self.assigned_case(caller, case_id).await?.into())
	}

	pub async fn update_case(
		&self,
		caller: &Caller,
		case_id: &str,
		req: UpdateCaseRequest,
	) -> Result<CaseView> {
		let mut checks = FieldChecks::new();

		if let Some(title) = req.title.as_deref() {
			checks.chars_between("title", title, 1, 200, "Title must be 1 to 200 characters");
		}

		checks.one_of("status", req.status.as_deref(), STATUSES);
		checks.one_of("priority", req.priority.as_deref(), PRIORITIES);

		let end_date = checks.timestamp("endDate", req.end_date.as_deref());

		checks.finish()?;

		let mut case = self.assigned_case(caller, case_id).await?;
		let previous_status = case.status.clone();

		if let Some(title) = req.title {
			case.title = title.trim().to_string();
		}
		if req.description.is_some() {
			case.description = validate::clean(req.description);
		}
		if req.case_number.is_some() {
			case.case_number = validate::clean(req.case_number);
		}
		if req.court.is_some() {
			case.court = validate::clean(req.court);
		}
		if let Some(status) = req.status {
			case.status = status;
		}
		if let Some(priority) = req.priority {
			case.priority = priority;
		}
		if end_date.is_some() {
			case.end_date = end_date;
		}
		if req.tags.is_some() {
			case.tags = validate::clean_tags(req.tags).map(Json);
		}

		case.updated_at = OffsetDateTime::now_utc();

		if !cases::update_case(&self.db, &case).await? {
			return Err(Error::not_found("Case"));
		}

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::Case,
				"updated",
				format!("Updated case {}", case.title),
				&caller.user_id,
			)
			.client(Some(&case.client_id))
			.case(Some(&case.id))
			.metadata(json!({ "previousStatus": previous_status, "status": case.status })),
		);

		Ok(case.into())
	}

	/// Cases belong to their assignee; admins see every case.
	pub(crate) async fn assigned_case(&self, caller: &Caller, case_id: &str) -> Result<Case> {
		let case = cases::get_case(&self.db, case_id)
			.await?
			.ok_or_else(|| Error::not_found("Case"))?;

		crate::ensure_owner(caller, &case.assigned_to, "Case")?;

		Ok(case)
	}
}
