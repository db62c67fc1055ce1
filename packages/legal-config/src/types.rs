use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub research: Research,
	#[serde(default)]
	pub rate_limit: RateLimit,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// "development" exposes internal error detail in HTTP responses; "production" hides it.
	#[serde(default = "default_environment")]
	pub environment: String,
}
impl Service {
	pub fn is_production(&self) -> bool {
		self.environment == "production"
	}
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub sqlite: Sqlite,
}

#[derive(Debug, Deserialize)]
pub struct Sqlite {
	/// Filesystem path of the database file. Created on first start.
	pub path: String,
	pub pool_max_conns: u32,
	#[serde(default = "default_busy_timeout_ms")]
	pub busy_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub deepseek: DeepSeekProviderConfig,
	pub inlegalbert: InLegalBertProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct DeepSeekProviderConfig {
	pub api_base: String,
	pub path: String,
	pub model: String,
	pub temperature: f64,
	pub system_prompt: String,
	/// Name of the credential, looked up in the settings table and then the environment.
	pub secret_key: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct InLegalBertProviderConfig {
	pub api_base: String,
	pub path: String,
	pub secret_key: String,
	#[serde(default = "default_wait_for_model")]
	pub wait_for_model: bool,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Research {
	pub confidence_threshold: f64,
	pub min_query_chars: u32,
	pub max_query_chars: u32,
	pub base_prompt: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RateLimit {
	pub enabled: bool,
	pub max_requests: u32,
	pub window_seconds: u64,
}
impl Default for RateLimit {
	fn default() -> Self {
		Self { enabled: true, max_requests: 100, window_seconds: 60 }
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	/// One of "off" or "static_keys".
	pub auth_mode: String,
	#[serde(default)]
	pub auth_keys: Vec<AuthKey>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthKey {
	pub token: String,
	pub user_id: String,
	pub name: String,
	pub email: String,
	#[serde(default = "default_role")]
	pub role: String,
}

fn default_environment() -> String {
	"development".to_string()
}

fn default_busy_timeout_ms() -> u64 {
	5_000
}

fn default_wait_for_model() -> bool {
	true
}

fn default_role() -> String {
	"lawyer".to_string()
}
