pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Conflict: {0}")]
	Conflict(String),
}

pub(crate) fn unique_as_conflict(err: sqlx::Error, message: &str) -> Error {
	let is_unique = err.as_database_error().is_some_and(|db_err| db_err.is_unique_violation());

	if is_unique { Error::Conflict(message.to_string()) } else { Error::Sqlx(err) }
}
