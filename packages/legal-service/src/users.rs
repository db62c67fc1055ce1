use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
	ActivityEntry, ActivityKind, Caller, Error, LegalService, Result,
	validate::{self, FieldChecks},
};
use legal_config::AuthKey;
use legal_storage::{models::User, users};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
	pub id: String,
	pub name: String,
	pub email: String,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub image: Option<String>,
	pub provider: Option<String>,
	pub role: String,
	pub is_active: bool,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl From<User> for UserView {
	fn from(row: User) -> Self {
		Self {
			id: row.id,
			name: row.name,
			email: row.email,
			phone: row.phone,
			address: row.address,
			image: row.image,
			provider: row.provider,
			role: row.role,
			is_active: row.is_active,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
	pub name: Option<String>,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub image: Option<String>,
}

impl LegalService {
	/// Maps a user id to an active caller, or rejects the request as unauthenticated.
	pub async fn resolve_caller(&self, user_id: &str) -> Result<Caller> {
		let user = users::get_active_user(&self.db, user_id.trim())
			.await?
			.ok_or_else(|| Error::unauthorized("Unknown or inactive user."))?;

		Ok(Caller { user_id: user.id, role: user.role })
	}

	/// Makes sure every configured API-key user exists and is active.
	pub async fn sync_key_users(&self, keys: &[AuthKey]) -> Result<()> {
		for key in keys {
			let now = OffsetDateTime::now_utc();
			let user = User {
				id: key.user_id.clone(),
				name: key.name.clone(),
				email: key.email.clone(),
				password: None,
				phone: None,
				address: None,
				image: None,
				provider: None,
				role: key.role.clone(),
				is_active: true,
				created_at: now,
				updated_at: now,
			};

			users::upsert_user_identity(&self.db, &user).await?;

			tracing::info!(user_id = %key.user_id, role = %key.role, "Synced API key user.");
		}

		Ok(())
	}

	pub async fn get_profile(&self, caller: &Caller) -> Result<UserView> {
		let user = users::get_active_user(&self.db, &caller.user_id)
			.await?
			.ok_or_else(|| Error::not_found("User"))?;

		Ok(user.into())
	}

	pub async fn update_profile(
		&self,
		caller: &Caller,
		req: UpdateProfileRequest,
	) -> Result<UserView> {
		let mut checks = FieldChecks::new();

		if let Some(name) = req.name.as_deref() {
			checks.chars_between("name", name, 1, 100, "Name must be 1 to 100 characters");
		}
		if let Some(image) = req.image.as_deref() {
			let image = image.trim();

			checks.check(
				image.starts_with("https://") || image.starts_with("http://"),
				"image",
				"Invalid image URL",
			);
		}

		checks.finish()?;

		let mut user = users::get_active_user(&self.db, &caller.user_id)
			.await?
			.ok_or_else(|| Error::not_found("User"))?;

		if let Some(name) = req.name {
			user.name = name.trim().to_string();
		}
		if req.phone.is_some() {
			user.phone = validate::clean(req.phone);
		}
		if req.address.is_some() {
			user.address = validate::clean(req.address);
		}
		if req.image.is_some() {
			user.image = validate::clean(req.image);
		}

		user.updated_at = OffsetDateTime::now_utc();

		if !users::update_user_profile(&self.db, &user).await? {
			return Err(Error::not_found("User"));
		}

		self.activity.emit(ActivityEntry::new(
			ActivityKind::System,
			"profile_updated",
			"Updated profile",
			&caller.user_id,
		));

		Ok(user.into())
	}
}
