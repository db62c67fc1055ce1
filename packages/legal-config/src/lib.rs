mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	AuthKey, Config, DeepSeekProviderConfig, InLegalBertProviderConfig, Providers, RateLimit,
	Research, Security, Service, Sqlite, Storage,
};

use std::{collections::HashSet, fs, path::Path};

const ROLES: [&str; 3] = ["user", "admin", "lawyer"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::MissingField { field: "service.http_bind" });
	}
	if !matches!(cfg.service.environment.as_str(), "development" | "production") {
		return Err(Error::Validation {
			message: "service.environment must be one of development or production.".to_string(),
		});
	}
	if cfg.storage.sqlite.path.trim().is_empty() {
		return Err(Error::MissingField { field: "storage.sqlite.path" });
	}
	if cfg.storage.sqlite.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.sqlite.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, api_base, secret_key, timeout_ms) in [
		(
			"deepseek",
			&cfg.providers.deepseek.api_base,
			&cfg.providers.deepseek.secret_key,
			cfg.providers.deepseek.timeout_ms,
		),
		(
			"inlegalbert",
			&cfg.providers.inlegalbert.api_base,
			&cfg.providers.inlegalbert.secret_key,
			cfg.providers.inlegalbert.timeout_ms,
		),
	] {
		if api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_base must be non-empty."),
			});
		}
		if secret_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.secret_key must be non-empty."),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
	}

	if cfg.providers.deepseek.model.trim().is_empty() {
		return Err(Error::MissingField { field: "providers.deepseek.model" });
	}
	if !cfg.providers.deepseek.temperature.is_finite()
		|| !(0.0..=2.0).contains(&cfg.providers.deepseek.temperature)
	{
		return Err(Error::Validation {
			message: "providers.deepseek.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}

	let threshold = cfg.research.confidence_threshold;

	if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
		return Err(Error::Validation {
			message: "research.confidence_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.research.min_query_chars == 0 {
		return Err(Error::Validation {
			message: "research.min_query_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.research.max_query_chars < cfg.research.min_query_chars {
		return Err(Error::Validation {
			message: "research.max_query_chars must be at least research.min_query_chars."
				.to_string(),
		});
	}
	if cfg.research.base_prompt.trim().is_empty() {
		return Err(Error::MissingField { field: "research.base_prompt" });
	}
	if cfg.rate_limit.enabled {
		if cfg.rate_limit.max_requests == 0 {
			return Err(Error::Validation {
				message: "rate_limit.max_requests must be greater than zero when enabled."
					.to_string(),
			});
		}
		if cfg.rate_limit.window_seconds == 0 {
			return Err(Error::Validation {
				message: "rate_limit.window_seconds must be greater than zero when enabled."
					.to_string(),
			});
		}
	}

	match cfg.security.auth_mode.as_str() {
		"off" => {},
		"static_keys" =>
			if cfg.security.auth_keys.is_empty() {
				return Err(Error::Validation {
					message: "security.auth_keys must be non-empty when security.auth_mode=static_keys."
						.to_string(),
				});
			},
		other => {
			return Err(Error::Validation {
				message: format!(
					"security.auth_mode must be one of off or static_keys, got {other}."
				),
			});
		},
	}

	let mut tokens = HashSet::new();

	for key in &cfg.security.auth_keys {
		for (label, value) in [
			("security.auth_keys.token", &key.token),
			("security.auth_keys.user_id", &key.user_id),
			("security.auth_keys.name", &key.name),
			("security.auth_keys.email", &key.email),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation { message: format!("{label} must be non-empty.") });
			}
		}

		if !ROLES.contains(&key.role.as_str()) {
			return Err(Error::Validation {
				message: "security.auth_keys.role must be one of user, admin, or lawyer."
					.to_string(),
			});
		}
		if !tokens.insert(key.token.as_str()) {
			return Err(Error::Validation {
				message: "security.auth_keys.token values must be unique.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.environment = cfg.service.environment.trim().to_ascii_lowercase();
	cfg.security.auth_mode = cfg.security.auth_mode.trim().to_string();

	for api_base in
		[&mut cfg.providers.deepseek.api_base, &mut cfg.providers.inlegalbert.api_base]
	{
		let trimmed = api_base.trim().trim_end_matches('/').to_string();

		*api_base = trimmed;
	}

	for key in &mut cfg.security.auth_keys {
		key.token = key.token.trim().to_string();
		key.email = key.email.trim().to_ascii_lowercase();
	}
}
