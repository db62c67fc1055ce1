use std::env;

use crate::LegalService;
use legal_storage::settings;

impl LegalService {
	/// Looks up a credential by name. A non-empty `settings` row wins over the environment
	/// variable of the same name. `None` means the credential is not configured.
	pub async fn resolve_secret(&self, key: &str) -> Option<String> {
		let stored = match settings::get_setting_value(&self.db, key).await {
			Ok(value) => value,
			Err(err) => {
				tracing::warn!(error = %err, key, "Failed to read secret from settings.");

				None
			},
		};

		pick_secret(stored, env::var(key).ok())
	}
}

fn pick_secret(stored: Option<String>, from_env: Option<String>) -> Option<String> {
	let non_blank = |value: String| {
		let trimmed = value.trim();

		if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
	};

	stored.and_then(non_blank).or_else(|| from_env.and_then(non_blank))
}
