pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{provider} API key not configured.")]
	MissingCredential { provider: &'static str },
	#[error("Failed to call {provider} API.")]
	Call { provider: &'static str },
	#[error("No response from {provider} API.")]
	EmptyResponse { provider: &'static str },
}
