use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Completion, Error, Result};
use legal_config::InLegalBertProviderConfig;

const PROVIDER: &str = "InLegalBERT";
const LABEL_DEFAULT_SCORE: f64 = 0.7;
const GENERATED_TEXT_SCORE: f64 = 0.8;
const RESULT_SCORE: f64 = 0.7;

/// Runs one inference call. Never fails: any problem yields an empty, zero-confidence completion.
pub async fn infer(
	cfg: &InLegalBertProviderConfig,
	api_key: Option<&str>,
	inputs: &str,
) -> Completion {
	match try_infer(cfg, api_key, inputs).await {
		Ok(completion) => completion,
		Err(err) => {
			tracing::warn!(error = %err, "InLegalBERT inference unavailable.");

			Completion::empty()
		},
	}
}

async fn try_infer(
	cfg: &InLegalBertProviderConfig,
	api_key: Option<&str>,
	inputs: &str,
) -> Result<Completion> {
	let Some(api_key) = crate::credential(api_key) else {
		return Err(Error::MissingCredential { provider: PROVIDER });
	};
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"inputs": inputs,
		"options": { "wait_for_model": cfg.wait_for_model },
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let status = res.status();

	if !status.is_success() {
		tracing::warn!(status = status.as_u16(), "InLegalBERT returned an error status.");

		return Ok(Completion::empty());
	}

	// An unparseable body reads as an empty object.
	let json = res.json::<Value>().await.unwrap_or_else(|_| Value::Object(Default::default()));

	Ok(parse_inference_response(&json))
}

fn parse_inference_response(json: &Value) -> Completion {
	if let Some(items) = json.as_array() {
		let Some(first) = items.first() else {
			return Completion::empty();
		};
		let Some(label) = first.get("label").and_then(Value::as_str).filter(|s| !s.is_empty())
		else {
			return Completion::empty();
		};
		// A zero score is treated like a missing one.
		let confidence = first
			.get("score")
			.and_then(Value::as_f64)
			.filter(|score| *score != 0.0)
			.unwrap_or(LABEL_DEFAULT_SCORE);

		return Completion { text: label.to_string(), confidence };
	}

	if let Some(text) =
		json.get("generated_text").and_then(Value::as_str).filter(|s| !s.is_empty())
	{
		return Completion { text: text.to_string(), confidence: GENERATED_TEXT_SCORE };
	}
	if let Some(text) = json.get("result").and_then(Value::as_str).filter(|s| !s.is_empty()) {
		return Completion { text: text.to_string(), confidence: RESULT_SCORE };
	}

	Completion::empty()
}
