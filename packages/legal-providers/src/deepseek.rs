use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Completion, Error, Result};
use legal_config::DeepSeekProviderConfig;

const PROVIDER: &str = "DeepSeek";

/// Confidence reported for every successful chat completion.
pub const CONFIDENCE: f64 = 0.85;

/// Runs one chat completion. Every failure is fatal to the caller.
pub async fn complete(
	cfg: &DeepSeekProviderConfig,
	api_key: Option<&str>,
	prompt: &str,
) -> Result<Completion> {
	let Some(api_key) = crate::credential(api_key) else {
		return Err(Error::MissingCredential { provider: PROVIDER });
	};
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = request_body(cfg, prompt);
	let res = client
		.post(&url)
		.headers(crate::auth_headers(api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await
		.map_err(|err| {
			tracing::warn!(error = %err, "DeepSeek request failed.");

			Error::Call { provider: PROVIDER }
		})?;
	let status = res.status();

	if !status.is_success() {
		let detail = res.text().await.unwrap_or_default();

		tracing::warn!(status = status.as_u16(), detail = %detail, "DeepSeek returned an error status.");

		return Err(Error::Call { provider: PROVIDER });
	}

	let json: Value = res.json().await.map_err(|err| {
		tracing::warn!(error = %err, "DeepSeek response body is not JSON.");

		Error::Call { provider: PROVIDER }
	})?;

	parse_completion_response(&json)
}

fn request_body(cfg: &DeepSeekProviderConfig, prompt: &str) -> Value {
	serde_json::json!({
		"model": cfg.model,
		"messages": [
			{ "role": "system", "content": cfg.system_prompt },
			{ "role": "user", "content": prompt },
		],
		"temperature": cfg.temperature,
	})
}

fn parse_completion_response(json: &Value) -> Result<Completion> {
	let text = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::trim)
		.unwrap_or_default();

	if text.is_empty() {
		return Err(Error::EmptyResponse { provider: PROVIDER });
	}

	Ok(Completion { text: text.to_string(), confidence: CONFIDENCE })
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use super::*;

	fn cfg() -> DeepSeekProviderConfig {
		DeepSeekProviderConfig {
			api_base: "http://127.0.0.1:9".to_string(),
			path: "/chat/completions".to_string(),
			model: "deepseek-chat".to_string(),
			temperature: 0.3,
			system_prompt: "You are a legal research assistant for Indian law.".to_string(),
			secret_key: "DEEPSEEK_API_KEY".to_string(),
			timeout_ms: 1_000,
			default_headers: Map::new(),
		}
	}

	#[test]
	fn trims_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "  Section 441 IPC covers criminal trespass.\n" } },
				{ "message": { "content": "ignored" } }
			]
		});
		let completion = parse_completion_response(&json).expect("parse failed");

		assert_eq!(completion.text, "Section 441 IPC covers criminal trespass.");
		assert_eq!(completion.confidence, CONFIDENCE);
	}

	#[test]
	fn blank_or_missing_content_is_an_empty_response() {
		for json in [
			serde_json::json!({ "choices": [] }),
			serde_json::json!({ "choices": [{ "message": { "content": "   " } }] }),
			serde_json::json!({ "error": "overloaded" }),
		] {
			let err = parse_completion_response(&json).expect_err("Expected empty response.");

			assert_eq!(err.to_string(), "No response from DeepSeek API.");
		}
	}

	#[test]
	fn request_body_carries_system_and_user_messages() {
		let body = request_body(&cfg(), "What is adverse possession?");

		assert_eq!(body["model"], "deepseek-chat");
		assert_eq!(body["temperature"], 0.3);
		assert_eq!(body["messages"][0]["role"], "system");
		assert_eq!(body["messages"][1]["role"], "user");
		assert_eq!(body["messages"][1]["content"], "What is adverse possession?");
	}
}
