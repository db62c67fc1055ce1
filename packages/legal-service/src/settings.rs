use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use crate::{
	ActivityEntry, ActivityKind, Caller, Error, LegalService, Result,
	validate::{self, FieldChecks},
};
use legal_storage::{models::Setting, settings};

const CATEGORIES: &[&str] = &["system", "user", "ai", "legal"];

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingView {
	pub key: String,
	pub value: String,
	pub description: Option<String>,
	pub category: String,
	pub is_public: bool,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl From<Setting> for SettingView {
	fn from(row: Setting) -> Self {
		Self {
			key: row.key,
			value: row.value,
			description: row.description,
			category: row.category,
			is_public: row.is_public,
			updated_at: row.updated_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSettingRequest {
	pub value: String,
	pub description: Option<String>,
	pub category: Option<String>,
	pub is_public: Option<bool>,
}

impl LegalService {
	/// Admins see every setting; everyone else sees the public ones.
	pub async fn list_settings(&self, caller: &Caller) -> Result<Vec<SettingView>> {
		let rows = if caller.is_admin() {
			settings::list_settings(&self.db).await?
		} else {
			settings::list_public_settings(&self.db).await?
		};

		Ok(rows.into_iter().map(SettingView::from).collect())
	}

	pub async fn get_setting(&self, caller: &Caller, key: &str) -> Result<SettingView> {
		let setting =
			settings::get_setting(&self.db, key).await?.ok_or_else(|| Error::not_found("Setting"))?;

		if !setting.is_public && !caller.is_admin() {
			return Err(Error::forbidden("Setting is restricted to administrators."));
		}

		Ok(setting.into())
	}

	/// Unspecified fields keep their stored values; new keys default to a private `system` entry.
	pub async fn upsert_setting(
		&self,
		caller: &Caller,
		key: &str,
		req: UpsertSettingRequest,
	) -> Result<SettingView> {
		if !caller.is_admin() {
			return Err(Error::forbidden("Only administrators may change settings."));
		}

		let key = key.trim();
		let mut checks = FieldChecks::new();

		checks.chars_between("key", key, 1, 100, "Key must be 1 to 100 characters");
		checks.one_of("category", req.category.as_deref(), CATEGORIES);
		checks.finish()?;

		let now = OffsetDateTime::now_utc();
		let existing = settings::get_setting(&self.db, key).await?;
		let setting = match existing {
			Some(mut setting) => {
				setting.value = req.value;

				if req.description.is_some() {
					setting.description = validate::clean(req.description);
				}
				if let Some(category) = req.category {
					setting.category = category;
				}
				if let Some(is_public) = req.is_public {
					setting.is_public = is_public;
				}

				setting.updated_at = now;

				setting
			},
			None => Setting {
				key: key.to_string(),
				value: req.value,
				description: validate::clean(req.description),
				category: req.category.unwrap_or_else(|| "system".to_string()),
				is_public: req.is_public.unwrap_or(false),
				created_at: now,
				updated_at: now,
			},
		};

		settings::upsert_setting(&self.db, &setting).await?;

		tracing::info!(key = %setting.key, user_id = %caller.user_id, "Setting updated.");

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::System,
				"setting_updated",
				format!("Updated setting {}", setting.key),
				&caller.user_id,
			)
			.metadata(json!({ "key": setting.key, "category": setting.category })),
		);

		Ok(setting.into())
	}

	/// Runtime value of a tunable setting. Blank values and read failures count as unset.
	pub(crate) async fn setting_value(&self, key: &str) -> Option<String> {
		match settings::get_setting_value(&self.db, key).await {
			Ok(value) => value.map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty()),
			Err(err) => {
				tracing::warn!(error = %err, key, "Failed to read setting. Using the default.");

				None
			},
		}
	}

	/// Integer setting constrained to `range`, or `fallback` when unset or unusable.
	pub(crate) async fn int_setting(
		&self,
		key: &str,
		range: RangeInclusive<i64>,
		fallback: i64,
	) -> i64 {
		let Some(raw) = self.setting_value(key).await else {
			return fallback;
		};

		match raw.parse::<i64>() {
			Ok(value) if range.contains(&value) => value,
			_ => {
				tracing::warn!(key, value = %raw, "Setting is out of range. Using the default.");

				fallback
			},
		}
	}
}
