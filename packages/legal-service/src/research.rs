use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::types::Json;
use time::OffsetDateTime;

use crate::{
	ActivityEntry, ActivityKind, Caller, Error, LegalService, ModelPreference, PageRequest, Paged,
	Result,
	validate::{self, FieldChecks},
};
use legal_storage::{ids, models::ResearchQuery, research, settings};

const PROMPT_BASE_KEY: &str = "PROMPT_BASE";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
	pub query: String,
	#[serde(default)]
	pub model: ModelPreference,
	pub client_id: Option<String>,
	pub case_id: Option<String>,
	#[serde(default)]
	pub save: bool,
	pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResponse {
	pub result: String,
	pub confidence: f64,
	/// The model the caller asked for.
	pub model: ModelPreference,
	/// The model whose answer was returned. Differs from `model` after a fallback.
	pub answered_by: ModelPreference,
	pub query: String,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
}

/// Input to the persistence writer.
#[derive(Clone, Debug)]
pub struct NewResearch {
	pub query: String,
	pub response: String,
	pub user_id: Option<String>,
	pub client_id: Option<String>,
	pub model: ModelPreference,
	pub confidence: Option<f64>,
	pub tags: Option<Vec<String>>,
}
impl NewResearch {
	pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
		Self {
			query: query.into(),
			response: response.into(),
			user_id: None,
			client_id: None,
			model: ModelPreference::DeepSeek,
			confidence: None,
			tags: None,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRecord {
	pub id: String,
	pub user_id: Option<String>,
	pub client_id: Option<String>,
	pub query_text: String,
	pub response_text: String,
	pub status: String,
	pub model: String,
	pub confidence: Option<f64>,
	pub tags: Vec<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl From<ResearchQuery> for ResearchRecord {
	fn from(row: ResearchQuery) -> Self {
		Self {
			id: row.id,
			user_id: row.user_id,
			client_id: row.client_id,
			query_text: row.query_text,
			response_text: row.response_text,
			status: row.status,
			model: row.model,
			confidence: row.confidence,
			tags: row.tags.map(|tags| tags.0).unwrap_or_default(),
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

impl LegalService {
	/// Answers a legal research question and optionally stores the exchange.
	pub async fn research(
		&self,
		caller: Option<&Caller>,
		req: ResearchRequest,
	) -> Result<ResearchResponse> {
		let min_chars = i64::from(self.cfg.research.min_query_chars);
		let max_chars = self
			.int_setting(
				"MAX_RESEARCH_LENGTH",
				min_chars..=i64::from(u32::MAX),
				i64::from(self.cfg.research.max_query_chars),
			)
			.await;
		let query = req.query.trim().to_string();
		let mut checks = FieldChecks::new();

		checks.chars_between(
			"query",
			&query,
			min_chars as usize,
			max_chars as usize,
			&format!("Query must be {min_chars} to {max_chars} characters"),
		);
		checks.finish()?;

		let client_id = validate::clean(req.client_id);
		let case_id = validate::clean(req.case_id);

		if (req.save || client_id.is_some() || case_id.is_some()) && caller.is_none() {
			return Err(Error::unauthorized("Saving or linking research requires a user."));
		}
		if let Some(caller) = caller {
			if let Some(client_id) = client_id.as_deref() {
				self.owned_client(caller, client_id).await?;
			}
			if let Some(case_id) = case_id.as_deref() {
				self.assigned_case(caller, case_id).await?;
			}
		}

		let prompt = format!("{}\n\nUser query: {query}", self.base_prompt().await);
		let dispatched = self.select_and_run(&prompt, req.model).await?;
		let completion = dispatched.completion;
		let mut id = None;

		if req.save {
			let record = self
				.save_research(NewResearch {
					query: query.clone(),
					response: completion.text.clone(),
					user_id: caller.map(|caller| caller.user_id.clone()),
					client_id: client_id.clone(),
					model: req.model,
					confidence: Some(completion.confidence),
					tags: req.tags,
				})
				.await?;

			id = Some(record.id);
		}

		if let Some(caller) = caller {
			self.activity.emit(
				ActivityEntry::new(
					ActivityKind::Research,
					"query",
					"Performed legal research",
					&caller.user_id,
				)
				.client(client_id.as_deref())
				.case(case_id.as_deref())
				.metadata(json!({
					"model": req.model.as_str(),
					"answeredBy": dispatched.model.as_str(),
					"confidence": completion.confidence,
					"saved": id.is_some(),
				})),
			);
		}

		tracing::info!(
			model = req.model.as_str(),
			answered_by = dispatched.model.as_str(),
			confidence = completion.confidence,
			saved = id.is_some(),
			"Research completed."
		);

		Ok(ResearchResponse {
			result: completion.text,
			confidence: completion.confidence,
			model: req.model,
			answered_by: dispatched.model,
			query,
			timestamp: OffsetDateTime::now_utc(),
			id,
		})
	}

	/// Persistence writer. Inserts one `completed` row and returns it; the query text is stored
	/// as given.
	pub async fn save_research(&self, new: NewResearch) -> Result<ResearchRecord> {
		if new.response.trim().is_empty() {
			return Err(Error::validation("response", "Response text must be non-empty"));
		}
		if let Some(confidence) = new.confidence
			&& !(0.0..=1.0).contains(&confidence)
		{
			return Err(Error::validation("confidence", "Confidence must be between 0 and 1"));
		}

		let now = OffsetDateTime::now_utc();
		let row = ResearchQuery {
			id: ids::new_id(ids::RESEARCH_QUERY),
			user_id: new.user_id,
			client_id: new.client_id,
			query_text: new.query,
			response_text: new.response,
			status: "completed".to_string(),
			model: new.model.as_str().to_string(),
			confidence: new.confidence,
			tags: validate::clean_tags(new.tags).map(Json),
			created_at: now,
			updated_at: now,
		};

		research::insert_research_query(&self.db, &row).await?;

		Ok(row.into())
	}

	pub async fn research_history(
		&self,
		caller: &Caller,
		page: PageRequest,
	) -> Result<Paged<ResearchRecord>> {
		let pagination = self.paginate(page).await?;
		let (rows, total) =
			research::list_research_by_user(&self.db, &caller.user_id, pagination.window()).await?;

		Ok(pagination.paged(rows, total))
	}

	pub async fn research_record(&self, caller: &Caller, id: &str) -> Result<ResearchRecord> {
		let row = research::get_research_query(&self.db, id)
			.await?
			.ok_or_else(|| Error::not_found("Research query"))?;

		match row.user_id.as_deref() {
			Some(owner) => crate::ensure_owner(caller, owner, "Research query")?,
			None if caller.is_admin() => {},
			None => return Err(Error::forbidden("Research query has no owner.")),
		}

		Ok(row.into())
	}

	pub async fn client_research(
		&self,
		caller: &Caller,
		client_id: &str,
		page: PageRequest,
	) -> Result<Paged<ResearchRecord>> {
		let pagination = self.paginate(page).await?;
		let client = self.owned_client(caller, client_id).await?;
		let (rows, total) =
			research::list_research_by_client(&self.db, &client.id, pagination.window()).await?;

		Ok(pagination.paged(rows, total))
	}

	async fn base_prompt(&self) -> String {
		match settings::get_setting_value(&self.db, PROMPT_BASE_KEY).await {
			Ok(Some(value)) if !value.trim().is_empty() => value,
			Ok(_) => self.cfg.research.base_prompt.clone(),
			Err(err) => {
				tracing::warn!(error = %err, "Failed to read PROMPT_BASE. Using the configured prompt.");

				self.cfg.research.base_prompt.clone()
			},
		}
	}
}
