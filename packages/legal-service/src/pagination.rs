use serde::{Deserialize, Serialize};

use crate::{LegalService, Result, validate::FieldChecks};
use legal_storage::models::Page;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Raw `page`/`limit` query parameters.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct PageRequest {
	pub page: Option<i64>,
	pub limit: Option<i64>,
}
impl PageRequest {
	/// Validates the request, using `default_limit` when no `limit` was given.
	pub(crate) fn resolve(self, default_limit: i64) -> Result<Pagination> {
		let page = self.page.unwrap_or(1);
		let limit = self.limit.unwrap_or(default_limit);
		let mut checks = FieldChecks::new();

		checks.check(page >= 1, "page", "Page must be at least 1");
		checks.check((1..=MAX_LIMIT).contains(&limit), "limit", "Limit must be between 1 and 100");
		checks.finish()?;

		Ok(Pagination { page, limit })
	}
}

impl LegalService {
	/// Resolves a page request against the `DEFAULT_PAGE_SIZE` setting.
	pub(crate) async fn paginate(&self, page: PageRequest) -> Result<Pagination> {
		let default_limit =
			self.int_setting("DEFAULT_PAGE_SIZE", 1..=MAX_LIMIT, DEFAULT_LIMIT).await;

		page.resolve(default_limit)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Pagination {
	pub(crate) page: i64,
	pub(crate) limit: i64,
}
impl Pagination {
	pub(crate) fn window(self) -> Page {
		Page { limit: self.limit, offset: (self.page - 1).saturating_mul(self.limit) }
	}

	pub(crate) fn paged<T, U>(self, rows: Vec<T>, total: i64) -> Paged<U>
	where
		U: From<T>,
	{
		let total_pages = if total == 0 { 0 } else { (total + self.limit - 1) / self.limit };

		Paged {
			items: rows.into_iter().map(U::from).collect(),
			pagination: PageMeta { page: self.page, limit: self.limit, total, total_pages },
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
	pub page: i64,
	pub limit: i64,
	pub total: i64,
	pub total_pages: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Paged<T> {
	pub items: Vec<T>,
	pub pagination: PageMeta,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_first_page_of_twenty() {
		let pagination =
			PageRequest::default().resolve(DEFAULT_LIMIT).expect("Defaults must be valid.");

		assert_eq!(pagination, Pagination { page: 1, limit: 20 });
		assert_eq!(pagination.window().offset, 0);
	}

	#[test]
	fn explicit_limit_beats_default() {
		let request = PageRequest { page: Some(2), limit: Some(5) };

		let pagination = request.resolve(50).expect("Request must be valid.");

		assert_eq!(pagination, Pagination { page: 2, limit: 5 });
		assert_eq!(PageRequest::default().resolve(50).expect("Defaults must be valid.").limit, 50);
	}

	#[test]
	fn rejects_out_of_range_values() {
		for (page, limit) in [(0, 20), (1, 0), (1, 101), (-3, 5)] {
			let request = PageRequest { page: Some(page), limit: Some(limit) };

			assert!(
				request.resolve(DEFAULT_LIMIT).is_err(),
				"page={page} limit={limit} must be rejected"
			);
		}
	}

	#[test]
	fn total_pages_rounds_up() {
		let pagination = Pagination { page: 3, limit: 10 };
		let paged: Paged<i64> = pagination.paged(vec![1_i64, 2], 21);

		assert_eq!(pagination.window().offset, 20);
		assert_eq!(paged.pagination.total_pages, 3);
		assert_eq!(paged.items, vec![1, 2]);
	}
}
