use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// One rejected request field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
	pub field: String,
	pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Validation failed")]
	Validation { details: Vec<FieldError> },
	#[error("Unauthorized: {message}")]
	Unauthorized { message: String },
	#[error("Forbidden: {message}")]
	Forbidden { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Rate limit exceeded. Retry in {retry_after_seconds} seconds.")]
	RateLimited { retry_after_seconds: u64 },
	#[error("AI service error: {message}")]
	Ai { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Validation {
			details: vec![FieldError { field: field.into(), message: message.into() }],
		}
	}

	pub(crate) fn not_found(resource: &str) -> Self {
		Self::NotFound { message: format!("{resource} not found.") }
	}

	pub(crate) fn forbidden(message: &str) -> Self {
		Self::Forbidden { message: message.to_string() }
	}

	pub(crate) fn unauthorized(message: &str) -> Self {
		Self::Unauthorized { message: message.to_string() }
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<legal_storage::Error> for Error {
	fn from(err: legal_storage::Error) -> Self {
		match err {
			legal_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			legal_storage::Error::InvalidArgument(message) =>
				Self::Validation { details: vec![FieldError { field: String::new(), message }] },
			legal_storage::Error::NotFound(message) => Self::NotFound { message },
			legal_storage::Error::Conflict(message) => Self::Conflict { message },
		}
	}
}

impl From<legal_providers::Error> for Error {
	fn from(err: legal_providers::Error) -> Self {
		Self::Ai { message: err.to_string() }
	}
}
