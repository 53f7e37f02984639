use std::time::Duration;

use lacquer_core::{Error, Host, Result, Target};

/// Bounded check/create attempts for a liveness marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub attempts: u32,
	pub delay: Duration,
}

impl RetryPolicy {
	pub const fn new(attempts: u32, delay: Duration) -> Self {
		Self { attempts, delay }
	}
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(3, Duration::from_secs(1))
	}
}

/// Makes sure `target` carries the liveness marker.
///
/// Each attempt checks first and only creates the marker when it is absent.
/// Check and creation failures count as a failed attempt. After the last
/// attempt the target is given up on with an [`Error::Injection`].
pub async fn establish_marker(host: &dyn Host, target: &Target, policy: RetryPolicy) -> Result<()> {
	let mut attempt = 0;
	loop {
		if host.has_marker(target).await.unwrap_or(false) {
			return Ok(());
		}
		if let Err(error) = host.create_marker(target).await {
			tracing::debug!(%target, attempt, %error, "marker creation failed");
		}

		attempt += 1;
		if attempt >= policy.attempts {
			return Err(Error::Injection {
				target: target.clone(),
				message: format!("marker injection was attempted {attempt} times, stopping"),
			});
		}
		tokio::time::sleep(policy.delay).await;
	}
}

#[cfg(test)]
mod tests {
	use lacquer_core::MemoryHost;

	use super::*;

	fn quick(attempts: u32) -> RetryPolicy {
		RetryPolicy::new(attempts, Duration::from_millis(1))
	}

	#[tokio::test]
	async fn present_marker_needs_no_creation() {
		let host = MemoryHost::new();
		let target = Target::from("SP");
		host.create_marker(&target).await.unwrap();
		host.refuse_markers("SP");

		establish_marker(&host, &target, quick(1)).await.unwrap();
	}

	#[tokio::test]
	async fn missing_marker_is_created_and_confirmed() {
		let host = MemoryHost::new();
		let target = Target::from("SP");

		establish_marker(&host, &target, quick(2)).await.unwrap();

		assert!(host.marker_present(&target));
	}

	#[tokio::test]
	async fn unreachable_target_gives_up_after_budget() {
		let host = MemoryHost::new();
		let target = Target::from("SP");
		host.refuse_markers("SP");

		let err = establish_marker(&host, &target, quick(3)).await.unwrap_err();

		assert_eq!(
			err.to_string(),
			"injection into 'SP' failed: marker injection was attempted 3 times, stopping"
		);
	}
}
