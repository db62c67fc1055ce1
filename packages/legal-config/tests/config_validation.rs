use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use legal_config::{AuthKey, Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("legal_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	let path = write_temp_config(SAMPLE_CONFIG_TOML.to_string());
	let result = legal_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result.expect("Failed to load test config.")
}

fn sample_toml_without_rate_limit() -> String {
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let root = value.as_table_mut().expect("Sample config must be a table.");

	root.remove("rate_limit");

	toml::to_string(&value).expect("Failed to render sample config.")
}

#[test]
fn sample_config_loads_and_normalizes() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML.to_string());
	let result = legal_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected sample config to load.");

	assert_eq!(cfg.service.environment, "development");
	assert!(!cfg.service.is_production());
	assert_eq!(cfg.providers.deepseek.api_base, "https://api.deepseek.com");
	assert_eq!(cfg.storage.sqlite.busy_timeout_ms, 5_000);
	assert!(cfg.providers.inlegalbert.wait_for_model);
	assert_eq!(cfg.security.auth_keys[0].token, "token-admin");
	assert_eq!(cfg.security.auth_keys[0].email, "admin@example.com");
}

#[test]
fn rate_limit_defaults_apply_when_section_is_missing() {
	let path = write_temp_config(sample_toml_without_rate_limit());
	let result = legal_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected config without [rate_limit] to load.");

	assert!(cfg.rate_limit.enabled);
	assert_eq!(cfg.rate_limit.max_requests, 100);
	assert_eq!(cfg.rate_limit.window_seconds, 60);
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("legal_config_test_does_not_exist.toml");
	let err = legal_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn malformed_toml_reports_parse_error() {
	let path = write_temp_config("[service\nhttp_bind = ".to_string());
	let result = legal_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn confidence_threshold_must_be_within_unit_range() {
	for threshold in [-0.1_f64, 1.5, f64::NAN] {
		let mut cfg = base_config();

		cfg.research.confidence_threshold = threshold;

		let err = legal_config::validate(&cfg).expect_err("Expected threshold validation error.");

		assert!(
			err.to_string().contains("research.confidence_threshold must be in the range 0.0-1.0."),
			"Unexpected error: {err}"
		);
	}

	let mut cfg = base_config();

	cfg.research.confidence_threshold = 1.0;

	assert!(legal_config::validate(&cfg).is_ok());
}

#[test]
fn http_bind_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.service.http_bind = "  ".to_string();

	let err = legal_config::validate(&cfg).expect_err("Expected http_bind validation error.");

	assert!(matches!(err, Error::MissingField { field: "service.http_bind" }));
	assert_eq!(err.to_string(), "service.http_bind must be non-empty.");
}

#[test]
fn static_keys_mode_requires_keys() {
	let mut cfg = base_config();

	cfg.security.auth_keys.clear();

	let err = legal_config::validate(&cfg).expect_err("Expected auth_keys validation error.");

	assert!(
		err.to_string().contains("security.auth_keys must be non-empty"),
		"Unexpected error: {err}"
	);

	cfg.security.auth_mode = "off".to_string();

	assert!(legal_config::validate(&cfg).is_ok());
}

#[test]
fn unknown_auth_mode_is_rejected() {
	let mut cfg = base_config();

	cfg.security.auth_mode = "jwt".to_string();

	let err = legal_config::validate(&cfg).expect_err("Expected auth_mode validation error.");

	assert!(err.to_string().contains("got jwt."), "Unexpected error: {err}");
}

#[test]
fn auth_key_tokens_must_be_unique() {
	let mut cfg = base_config();
	let first = cfg.security.auth_keys[0].clone();

	cfg.security.auth_keys.push(AuthKey { user_id: "user_other".to_string(), ..first });

	let err = legal_config::validate(&cfg).expect_err("Expected duplicate token error.");

	assert!(
		err.to_string().contains("security.auth_keys.token values must be unique."),
		"Unexpected error: {err}"
	);
}

#[test]
fn auth_key_role_must_be_known() {
	let mut cfg = base_config();

	cfg.security.auth_keys[0].role = "clerk".to_string();

	let err = legal_config::validate(&cfg).expect_err("Expected role validation error.");

	assert!(err.to_string().contains("security.auth_keys.role"), "Unexpected error: {err}");
}

#[test]
fn query_bounds_must_be_ordered() {
	let mut cfg = base_config();

	cfg.research.min_query_chars = 10;
	cfg.research.max_query_chars = 5;

	let err = legal_config::validate(&cfg).expect_err("Expected query bounds validation error.");

	assert!(
		err.to_string()
			.contains("research.max_query_chars must be at least research.min_query_chars."),
		"Unexpected error: {err}"
	);
}

#[test]
fn rate_limit_values_are_checked_only_when_enabled() {
	let mut cfg = base_config();

	cfg.rate_limit.max_requests = 0;

	assert!(legal_config::validate(&cfg).is_err());

	cfg.rate_limit.enabled = false;

	assert!(legal_config::validate(&cfg).is_ok());
}
