pub mod deepseek;
pub mod inlegalbert;

mod error;

pub use error::{Error, Result};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};

/// Normalized output of a provider call.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
	pub text: String,
	pub confidence: f64,
}
impl Completion {
	pub fn empty() -> Self {
		Self { text: String::new(), confidence: 0.0 }
	}

	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}
}

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

fn credential(api_key: Option<&str>) -> Option<&str> {
	api_key.map(str::trim).filter(|key| !key.is_empty())
}
