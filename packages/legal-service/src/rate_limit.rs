use std::{
	collections::{HashMap, VecDeque},
	sync::Mutex,
	time::{Duration, Instant},
};

use crate::{Error, Result};

/// Upper bound on tracked keys. New keys beyond it are rejected until buckets expire.
const MAX_KEYS: usize = 4_096;

/// In-memory sliding-window limiter keyed by caller. State is lost on restart.
#[derive(Debug)]
pub struct RateLimiter {
	enabled: bool,
	max_requests: usize,
	window: Duration,
	max_keys: usize,
	hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}
impl RateLimiter {
	pub fn new(max_requests: u32, window: Duration) -> Self {
		Self {
			enabled: true,
			max_requests: max_requests as usize,
			window,
			max_keys: MAX_KEYS,
			hits: Mutex::new(HashMap::new()),
		}
	}

	pub fn disabled() -> Self {
		Self { enabled: false, ..Self::new(0, Duration::ZERO) }
	}

	pub fn from_config(cfg: &legal_config::RateLimit) -> Self {
		if cfg.enabled {
			Self::new(cfg.max_requests, Duration::from_secs(cfg.window_seconds))
		} else {
			Self::disabled()
		}
	}

	pub fn check(&self, key: &str) -> Result<()> {
		self.check_at(key, Instant::now())
	}

	/// Records a hit for `key` at `now`, or rejects it with the seconds until a slot frees up.
	pub fn check_at(&self, key: &str, now: Instant) -> Result<()> {
		if !self.enabled {
			return Ok(());
		}

		let mut hits = self.hits.lock().unwrap_or_else(|err| err.into_inner());

		self.prune(&mut hits, now);

		if !hits.contains_key(key) && hits.len() >= self.max_keys {
			tracing::warn!(keys = hits.len(), "Rate limiter key table is full.");

			return Err(Error::RateLimited { retry_after_seconds: self.window_seconds() });
		}

		let window = hits.entry(key.to_string()).or_default();

		if window.len() >= self.max_requests {
			let retry_after = window
				.front()
				.map(|oldest| self.window.saturating_sub(now.saturating_duration_since(*oldest)))
				.unwrap_or(self.window);
			// Round up so clients never retry early.
			let retry_after_seconds =
				retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);

			return Err(Error::RateLimited { retry_after_seconds: retry_after_seconds.max(1) });
		}

		window.push_back(now);

		Ok(())
	}

	/// Drops expired hits from every bucket and forgets keys whose bucket emptied.
	fn prune(&self, hits: &mut HashMap<String, VecDeque<Instant>>, now: Instant) {
		hits.retain(|_, bucket| {
			while let Some(oldest) = bucket.front() {
				if now.saturating_duration_since(*oldest) >= self.window {
					bucket.pop_front();
				} else {
					break;
				}
			}

			!bucket.is_empty()
		});
	}

	fn window_seconds(&self) -> u64 {
		let secs = self.window.as_secs() + u64::from(self.window.subsec_nanos() > 0);

		secs.max(1)
	}

	#[cfg(test)]
	fn tracked_keys(&self) -> usize {
		self.hits.lock().unwrap_or_else(|err| err.into_inner()).len()
	}
}
