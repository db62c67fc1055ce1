use std::sync::LazyLock;

use regex::Regex;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, FieldError, Result};

static EMAIL: LazyLock<Result<Regex, regex::Error>> =
	LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$"));

/// Collects every failing field before reporting, so one response lists all problems.
#[derive(Debug, Default)]
pub(crate) struct FieldChecks {
	errors: Vec<FieldError>,
}
impl FieldChecks {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn fail(&mut self, field: &str, message: &str) {
		self.errors.push(FieldError { field: field.to_string(), message: message.to_string() });
	}

	pub(crate) fn check(&mut self, ok: bool, field: &str, message: &str) {
		if !ok {
			self.fail(field, message);
		}
	}

	/// Character count of the trimmed value must lie within `min..=max`.
	pub(crate) fn chars_between(
		&mut self,
		field: &str,
		value: &str,
		min: usize,
		max: usize,
		message: &str,
	) {
		let count = value.trim().chars().count();

		self.check((min..=max).contains(&count), field, message);
	}

	pub(crate) fn min_chars(&mut self, field: &str, value: &str, min: usize, message: &str) {
		self.check(value.trim().chars().count() >= min, field, message);
	}

	pub(crate) fn email(&mut self, field: &str, value: Option<&str>) {
		if let Some(value) = value {
			self.check(is_email(value.trim()), field, "Invalid email format");
		}
	}

	pub(crate) fn one_of(&mut self, field: &str, value: Option<&str>, allowed: &[&str]) {
		if let Some(value) = value
			&& !allowed.contains(&value)
		{
			self.fail(field, &format!("Must be one of: {}", allowed.join(", ")));
		}
	}

	pub(crate) fn timestamp(&mut self, field: &str, value: Option<&str>) -> Option<OffsetDateTime> {
		let value = value?;

		match OffsetDateTime::parse(value.trim(), &Rfc3339) {
			Ok(parsed) => Some(parsed),
			Err(_) => {
				self.fail(field, "Invalid date format");

				None
			},
		}
	}

	pub(crate) fn finish(self) -> Result<()> {
		if self.errors.is_empty() {
			Ok(())
		} else {
			Err(Error::Validation { details: self.errors })
		}
	}
}

pub(crate) fn is_email(value: &str) -> bool {
	match EMAIL.as_ref() {
		Ok(re) => re.is_match(value),
		Err(_) => false,
	}
}

/// Trims and drops blank optional strings.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
	value.map(|raw| raw.trim().to_string()).filter(|trimmed| !trimmed.is_empty())
}

/// Trims every tag and drops blanks. An empty result becomes `None`.
pub(crate) fn clean_tags(tags: Option<Vec<String>>) -> Option<Vec<String>> {
	let cleaned = tags?
		.into_iter()
		.map(|tag| tag.trim().to_string())
		.filter(|tag| !tag.is_empty())
		.collect::<Vec<_>>();

	if cleaned.is_empty() { None } else { Some(cleaned) }
}
