use std::time::Duration;

use crate::error::RetryableError;

/// Backoff policy: exponential with a bounded ceiling and a capped attempt
/// count.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
	pub initial_interval: Duration,
	pub factor: f64,
	pub max_interval: Duration,
	pub max_attempts: u32,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self { initial_interval: Duration::from_millis(100), factor: 1.5, max_interval: Duration::from_secs(1), max_attempts: 5 }
	}
}

/// Mutable per-invocation retry state. Constructed fresh for each top-level
/// call to a [`crate::handler::MethodHandler`]; never shared across calls.
#[derive(Debug)]
pub struct Retryer {
	policy: RetryPolicy,
	attempt: u32,
	interval: Duration,
}

impl Retryer {
	pub fn new(policy: RetryPolicy) -> Self {
		let interval = policy.initial_interval;
		Self { policy, attempt: 0, interval }
	}

	/// Sleeps (honoring the error's own `retry_after` if it carries one) and
	/// returns `Ok(())` to continue the loop, or gives the error back once
	/// `max_attempts` is reached.
	pub async fn continue_or_propagate(&mut self, error: RetryableError) -> Result<(), RetryableError> {
		self.attempt += 1;
		if self.attempt >= self.policy.max_attempts {
			return Err(error);
		}
		let sleep_for = error.retry_after.unwrap_or(self.interval);
		tokio::time::sleep(sleep_for).await;
		self.interval = Duration::from_secs_f64((self.interval.as_secs_f64() * self.policy.factor).min(self.policy.max_interval.as_secs_f64()));
		Ok(())
	}

	pub fn attempts_made(&self) -> u32 {
		self.attempt
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn gives_the_error_back_once_max_attempts_is_reached() {
		let mut retryer = Retryer::new(RetryPolicy { initial_interval: Duration::from_millis(1), max_attempts: 2, ..Default::default() });
		retryer.continue_or_propagate(RetryableError::new("first")).await.unwrap();
		let err = retryer.continue_or_propagate(RetryableError::new("second")).await.unwrap_err();
		assert_eq!(err.message, "second");
	}
}
