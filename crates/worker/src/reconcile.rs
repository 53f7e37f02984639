//! Drift detection and repair.
//!
//! Every cycle checks each known target for its liveness marker. A target
//! without one was reloaded out of band: the marker is re-established with
//! a bounded retry, then every enabled unit declaring that target is
//! reapplied. Failures are per target and never stop the loop.

use std::sync::Arc;
use std::time::Duration;

use lacquer_core::{Host, Target, ThemeRegistry};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{RetryPolicy, TaskClass, establish_marker};


/// Shortest pause between cycles.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Timing of the reconciliation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileConfig {
	/// Pause between the end of one tick and the next check round.
	pub interval: Duration,
	/// Marker retry budget for a drifted target, per cycle.
	pub marker: RetryPolicy,
}

impl Default for ReconcileConfig {
	fn default() -> Self {
		Self {
			interval: Duration::from_secs(3),
			marker: RetryPolicy::default(),
		}
	}
}

/// What one cycle observed and did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
	pub checked: usize,
	pub drifted: usize,
	pub repaired: usize,
	pub reapplied: usize,
	pub failed: usize,
}

/// Restores live state on targets that lost their marker.
#[derive(Clone)]
pub struct Reconciler {
	registry: Arc<Mutex<ThemeRegistry>>,
	host: Arc<dyn Host>,
	config: ReconcileConfig,
}

impl Reconciler {
	pub fn new(registry: Arc<Mutex<ThemeRegistry>>, host: Arc<dyn Host>, config: ReconcileConfig) -> Self {
		Self { registry, host, config }
	}

	/// Checks every known target once and repairs the drifted ones.
	///
	/// The registry lock is only held to snapshot targets and to reapply, so
	/// commands can interleave with the marker checks and marker retries.
	pub async fn run_cycle(&self) -> CycleReport {
		let targets: Vec<Target> = self.registry.lock().await.index().targets().cloned().collect();

		let mut report = CycleReport::default();
		for target in targets {
			report.checked += 1;
			if self.host.has_marker(&target).await.unwrap_or(false) {
				continue;
			}

			report.drifted += 1;
			tracing::info!(%target, "target lost its marker, reapplying");
			if let Err(error) = establish_marker(self.host.as_ref(), &target, self.config.marker).await {
				tracing::warn!(%target, %error, "could not restore marker");
				report.failed += 1;
				continue;
			}

			match self.registry.lock().await.repair_target(&target).await {
				Ok(count) => {
					tracing::debug!(%target, count, "target repaired");
					report.repaired += 1;
					report.reapplied += count;
				}
				Err(error) => {
					tracing::warn!(%target, %error, "target repair failed");
					report.failed += 1;
				}
			}
		}
		report
	}

	/// Runs cycles on the configured interval until `cancel` fires.
	///
	/// A cycle already in progress runs to completion before the loop exits,
	/// so no unit is left with its handles taken but not reissued. A zero
	/// interval is raised to [`MIN_INTERVAL`].
	pub fn spawn(self, cancel: CancellationToken) -> ReconcilerHandle {
		let token = cancel.clone();
		let task = crate::spawn(TaskClass::Reconcile, async move {
			let period = self.config.interval.max(MIN_INTERVAL);
			let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				tokio::select! {
					biased;
					_ = token.cancelled() => break,
					_ = ticker.tick() => {}
				}

				let report = self.run_cycle().await;
				if report.drifted > 0 {
					tracing::info!(
						drifted = report.drifted,
						repaired = report.repaired,
						reapplied = report.reapplied,
						failed = report.failed,
						"reconciliation cycle"
					);
				}
			}
			tracing::debug!("reconciliation loop stopped");
		});

		ReconcilerHandle { cancel, task: Some(task) }
	}
}

/// Owner of a running reconciliation loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct ReconcilerHandle {
	cancel: CancellationToken,
	task: Option<JoinHandle<()>>,
}

impl ReconcilerHandle {
	pub fn is_running(&self) -> bool {
		self.task.as_ref().is_some_and(|task| !task.is_finished())
	}

	/// Cancels the loop and waits for it to wind down.
	pub async fn shutdown(mut self) {
		self.cancel.cancel();
		if let Some(task) = self.task.take()
			&& let Err(error) = task.await
		{
			tracing::warn!(%error, "reconciliation loop ended abnormally");
		}
	}
}

impl Drop for ReconcilerHandle {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}
