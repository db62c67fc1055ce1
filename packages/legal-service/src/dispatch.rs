use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, LegalService, Result};
use legal_providers::Completion;

static NEWLINE_RUN: LazyLock<Result<Regex, regex::Error>> =
	LazyLock::new(|| Regex::new(r"\n{3,}"));

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelPreference {
	#[default]
	DeepSeek,
	InLegalBert,
}
impl ModelPreference {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::DeepSeek => "deepseek",
			Self::InLegalBert => "inlegalbert",
		}
	}
}

/// Dispatcher output: the completion and the model that actually produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatched {
	pub completion: Completion,
	pub model: ModelPreference,
}

impl LegalService {
	/// Runs `prompt` against the preferred model.
	///
	/// `DeepSeek` calls DeepSeek only. `InLegalBert` tries InLegalBERT first and accepts its answer
	/// only when the text is non-empty and the confidence reaches
	/// `research.confidence_threshold`; otherwise DeepSeek is called exactly once.
	pub async fn select_and_run(
		&self,
		prompt: &str,
		preference: ModelPreference,
	) -> Result<Dispatched> {
		if preference == ModelPreference::InLegalBert {
			let cfg = &self.cfg.providers.inlegalbert;
			let api_key = self.resolve_secret(&cfg.secret_key).await;
			let primary = self.providers.inlegalbert.infer(cfg, api_key.as_deref(), prompt).await;
			let threshold = self.cfg.research.confidence_threshold;

			if !primary.text.is_empty() && primary.confidence >= threshold {
				return Ok(Dispatched {
					completion: Completion {
						text: collapse_newline_runs(&primary.text),
						confidence: primary.confidence,
					},
					model: ModelPreference::InLegalBert,
				});
			}

			tracing::info!(
				confidence = primary.confidence,
				threshold,
				empty = primary.text.is_empty(),
				"InLegalBERT answer rejected. Falling back to DeepSeek."
			);
		}

		let completion = self.run_deepseek(prompt).await?;

		Ok(Dispatched { completion, model: ModelPreference::DeepSeek })
	}

	async fn run_deepseek(&self, prompt: &str) -> Result<Completion> {
		let cfg = &self.cfg.providers.deepseek;
		let api_key = self.resolve_secret(&cfg.secret_key).await;

		self.providers.deepseek.complete(cfg, api_key.as_deref(), prompt).await.map_err(|err| {
			tracing::error!(error = %err, "DeepSeek call failed.");

			Error::Ai { message: err.to_string() }
		})
	}
}

/// Replaces every run of three or more newlines with exactly two. Nothing else changes.
pub fn collapse_newline_runs(text: &str) -> String {
	match NEWLINE_RUN.as_ref() {
		Ok(re) => re.replace_all(text, "\n\n").into_owned(),
		Err(_) => text.to_string(),
	}
}
