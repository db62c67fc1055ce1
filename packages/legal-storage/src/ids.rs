use uuid::Uuid;

pub const USER: &str = "user";
pub const CLIENT: &str = "client";
pub const DIRECTORY: &str = "dir";
pub const SUBDIRECTORY: &str = "sub";
pub const RESEARCH_QUERY: &str = "rq";
pub const DOCUMENT: &str = "doc";
pub const CASE: &str = "case";
pub const ACTIVITY: &str = "act";

/// Builds a row id of the form `<prefix>_<32 hex chars>`.
pub fn new_id(prefix: &str) -> String {
	format!("{prefix}_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_carry_prefix_and_are_distinct() {
		let a = new_id(RESEARCH_QUERY);
		let b = new_id(RESEARCH_QUERY);

		assert!(a.starts_with("rq_"));
		assert_eq!(a.len(), "rq_".len() + 32);
		assert_ne!(a, b);
	}
}
