use std::{collections::HashMap, sync::Arc, time::Instant};

use legal_config::{Config, Security};
use legal_service::LegalService;
use legal_storage::db::Db;

/// How callers prove who they are.
#[derive(Clone, Debug)]
pub enum AuthMode {
	/// Identity comes from the optional `X-Legal-User-Id` header.
	Off,
	/// Bearer token mapped to a configured user id.
	StaticKeys { tokens: Arc<HashMap<String, String>> },
}
impl AuthMode {
	pub fn from_config(security: &Security) -> Self {
		match security.auth_mode.as_str() {
			"static_keys" => Self::StaticKeys {
				tokens: Arc::new(
					security
						.auth_keys
						.iter()
						.map(|key| (key.token.clone(), key.user_id.clone()))
						.collect(),
				),
			},
			_ => Self::Off,
		}
	}
}

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LegalService>,
	pub auth: AuthMode,
	pub started_at: Instant,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.sqlite).await?;

		db.ensure_schema().await?;

		let keys = config.security.auth_keys.clone();
		let service = LegalService::new(config, db);

		service.sync_key_users(&keys).await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: LegalService) -> Self {
		let auth = AuthMode::from_config(&service.cfg.security);

		Self { service: Arc::new(service), auth, started_at: Instant::now() }
	}

	pub fn is_production(&self) -> bool {
		self.service.cfg.service.is_production()
	}
}
