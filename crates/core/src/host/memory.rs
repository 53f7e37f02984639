use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;

use super::{Host, HostError};
use crate::Target;

#[derive(Debug, Default)]
struct State {
	next_id: u64,
	injected: usize,
	fragments: HashMap<Target, IndexMap<String, String>>,
	markers: HashSet<Target>,
	failing: HashSet<Target>,
	refusing_markers: HashSet<Target>,
}

/// In-memory [`Host`] that records every fragment and marker.
///
/// Used for dry runs and tests. Targets can be made to fail injections, to
/// refuse markers, or to lose all state as if they had been reloaded.
#[derive(Debug, Default)]
pub struct MemoryHost {
	state: Mutex<State>,
}

impl MemoryHost {
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes every subsequent injection into `target` fail.
	pub fn fail_injections(&self, target: impl Into<Target>) {
		self.state.lock().failing.insert(target.into());
	}

	/// Makes every subsequent marker creation on `target` fail.
	pub fn refuse_markers(&self, target: impl Into<Target>) {
		self.state.lock().refusing_markers.insert(target.into());
	}

	/// Clears scripted failures for `target`.
	pub fn heal(&self, target: &Target) {
		let mut state = self.state.lock();
		state.failing.remove(target);
		state.refusing_markers.remove(target);
	}

	/// Drops all fragments and the marker of `target`, out of band.
	pub fn reload(&self, target: &Target) {
		let mut state = self.state.lock();
		state.fragments.remove(target);
		state.markers.remove(target);
	}

	/// Sources of the fragments currently live on `target`, in injection order.
	pub fn fragments(&self, target: &Target) -> Vec<String> {
		self.state
			.lock()
			.fragments
			.get(target)
			.map(|live| live.values().cloned().collect())
			.unwrap_or_default()
	}

	/// Number of fragments currently live on `target`.
	pub fn fragment_count(&self, target: &Target) -> usize {
		self.state.lock().fragments.get(target).map_or(0, IndexMap::len)
	}

	/// Whether `target` currently carries the marker.
	pub fn marker_present(&self, target: &Target) -> bool {
		self.state.lock().markers.contains(target)
	}

	/// Total number of successful injections since creation.
	pub fn injected(&self) -> usize {
		self.state.lock().injected
	}
}

#[async_trait]
impl Host for MemoryHost {
	async fn inject_fragment(&self, target: &Target, source: &str) -> Result<String, HostError> {
		let mut state = self.state.lock();
		if state.failing.contains(target) {
			return Err(HostError::new(format!("target '{target}' rejected the fragment")));
		}
		state.next_id += 1;
		state.injected += 1;
		let id = format!("frag-{}", state.next_id);
		state
			.fragments
			.entry(target.clone())
			.or_default()
			.insert(id.clone(), source.to_string());
		Ok(id)
	}

	async fn remove_fragment(&self, target: &Target, id: &str) -> Result<(), HostError> {
		let mut state = self.state.lock();
		match state.fragments.get_mut(target).and_then(|live| live.shift_remove(id)) {
			Some(_) => Ok(()),
			None => Err(HostError::new(format!("no fragment '{id}' on '{target}'"))),
		}
	}

	async fn has_marker(&self, target: &Target) -> Result<bool, HostError> {
		Ok(self.state.lock().markers.contains(target))
	}

	async fn create_marker(&self, target: &Target) -> Result<(), HostError> {
		let mut state = self.state.lock();
		if state.refusing_markers.contains(target) {
			return Err(HostError::new(format!("target '{target}' is not reachable")));
		}
		state.markers.insert(target.clone());
		Ok(())
	}
}
