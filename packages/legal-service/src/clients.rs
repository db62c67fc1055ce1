use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use crate::{
	ActivityEntry, ActivityKind, Caller, Error, LegalService, PageRequest, Paged, Result,
	validate::{self, FieldChecks},
};
use legal_storage::{clients, ids, models::Client};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
	pub id: String,
	pub name: String,
	pub email: Option<String>,
	pub phone: String,
	pub address: Option<String>,
	pub reference_id: Option<String>,
	pub user_id: String,
	pub is_active: bool,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl From<Client> for ClientView {
	fn from(row: Client) -> Self {
		Self {
			id: row.id,
			name: row.name,
			email: row.email,
			phone: row.phone,
			address: row.address,
			reference_id: row.reference_id,
			user_id: row.user_id,
			is_active: row.is_active,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
	pub name: String,
	pub email: Option<String>,
	pub phone: String,
	pub address: Option<String>,
	pub reference_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
	pub name: Option<String>,
	pub email: Option<String>,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub reference_id: Option<String>,
}

impl LegalService {
	pub async fn create_client(
		&self,
		caller: &Caller,
		req: CreateClientRequest,
	) -> Result<ClientView> {
		let mut checks = FieldChecks::new();

		checks.chars_between("name", &req.name, 1, 100, "Name must be 1 to 100 characters");
		checks.min_chars("phone", &req.phone, 10, "Phone number must be at least 10 characters");
		checks.email("email", req.email.as_deref());
		checks.finish()?;

		let now = OffsetDateTime::now_utc();
		let client = Client {
			id: ids::new_id(ids::CLIENT),
			name: req.name.trim().to_string(),
			email: validate::clean(req.email),
			phone: req.phone.trim().to_string(),
			address: validate::clean(req.address),
			reference_id: validate::clean(req.reference_id),
			user_id: caller.user_id.clone(),
			is_active: true,
			created_at: now,
			updated_at: now,
		};

		clients::insert_client(&self.db, &client).await?;

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::Client,
				"created",
				format!("Created client {}", client.name),
				&caller.user_id,
			)
			.client(Some(&client.id)),
		);

		Ok(client.into())
	}

	pub async fn list_clients(&self, caller: &Caller, page: PageRequest) -> Result<Paged<ClientView>> {
		let pagination = self.paginate(page).await?;
		let (rows, total) =
			clients::list_clients_by_owner(&self.db, &caller.user_id, pagination.window()).await?;

		Ok(pagination.paged(rows, total))
	}

	pub async fn get_client(&self, caller: &Caller, client_id: &str) -> Result<ClientView> {
		Ok(self.owned_client(caller, client_id).await?.into())
	}

	pub async fn update_client(
		&self,
		caller: &Caller,
		client_id: &str,
		req: UpdateClientRequest,
	) -> Result<ClientView> {
		let mut checks = FieldChecks::new();

		if let Some(name) = req.name.as_deref() {
			checks.chars_between("name", name, 1, 100, "Name must be 1 to 100 characters");
		}
		if let Some(phone) = req.phone.as_deref() {
			checks.min_chars("phone", phone, 10, "Phone number must be at least 10 characters");
		}

		checks.email("email", req.email.as_deref());
		checks.finish()?;

		let mut client = self.owned_client(caller, client_id).await?;
		let mut changed = Vec::new();

		if let Some(name) = req.name {
			client.name = name.trim().to_string();

			changed.push("name");
		}
		if let Some(phone) = req.phone {
			client.phone = phone.trim().to_string();

			changed.push("phone");
		}
		if req.email.is_some() {
			client.email = validate::clean(req.email);

			changed.push("email");
		}
		if req.address.is_some() {
			client.address = validate::clean(req.address);

			changed.push("address");
		}
		if req.reference_id.is_some() {
			client.reference_id = validate::clean(req.reference_id);

			changed.push("referenceId");
		}

		client.updated_at = OffsetDateTime::now_utc();

		if !clients::update_client(&self.db, &client).await? {
			return Err(Error::not_found("Client"));
		}

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::Client,
				"updated",
				format!("Updated client {}", client.name),
				&caller.user_id,
			)
			.client(Some(&client.id))
			.metadata(json!({ "fields": changed })),
		);

		Ok(client.into())
	}

	/// Soft delete. Saved research keeps pointing at the client.
	pub async fn delete_client(&self, caller: &Caller, client_id: &str) -> Result<()> {
		let client = self.owned_client(caller, client_id).await?;

		if !clients::deactivate_client(&self.db, &client.id, OffsetDateTime::now_utc()).await? {
			return Err(Error::not_found("Client"));
		}

		self.activity.emit(
			ActivityEntry::new(
				ActivityKind::Client,
				"deleted",
				format!("Deleted client {}", client.name),
				&caller.user_id,
			)
			.client(Some(&client.id)),
		);

		Ok(())
	}

	/// Loads an active client the caller may act on: 404 when missing, 403 when foreign.
	pub(crate) async fn owned_client(&self, caller: &Caller, client_id: &str) -> Result<Client> {
		let client = clients::get_active_client(&self.db, client_id)
			.await?
			.ok_or_else(|| Error::not_found("Client"))?;

		crate::ensure_owner(caller, &client.user_id, "Client")?;

		Ok(client)
	}
}
