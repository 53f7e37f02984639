//! The smallest apply/remove-able piece of styling.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::{Error, Host, InjectionHandle, Result, Target};


/// Where a unit's fragment text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitSource {
	/// Fragment file inside a theme directory, read on first use.
	File(PathBuf),
	/// Generated text owned by a [`Component`](crate::Component).
	Derived,
}

/// One style fragment bound to a set of targets.
///
/// Holds at most one live handle per target: applying to a target that
/// already carries this unit removes the old handle first.
///
/// `enabled` is sticky. Once the unit has been applied anywhere it stays
/// enabled until an explicit removal, even if a later apply fails, so the
/// reconciler keeps retrying it.
#[derive(Debug, Clone)]
pub struct Unit {
	source: UnitSource,
	fragment: Option<String>,
	targets: Vec<Target>,
	handles: HashMap<Target, Vec<InjectionHandle>>,
	enabled: bool,
}

impl Unit {
	/// Creates a unit backed by a fragment file.
	pub fn from_file(path: impl Into<PathBuf>, targets: impl IntoIterator<Item = Target>) -> Self {
		Self::with_source(UnitSource::File(path.into()), None, targets)
	}

	/// Creates a unit whose fragment is generated in memory.
	pub fn derived(fragment: impl Into<String>, targets: impl IntoIterator<Item = Target>) -> Self {
		Self::with_source(UnitSource::Derived, Some(fragment.into()), targets)
	}

	fn with_source(source: UnitSource, fragment: Option<String>, targets: impl IntoIterator<Item = Target>) -> Self {
		let mut declared: Vec<Target> = Vec::new();
		for target in targets {
			if !declared.contains(&target) {
				declared.push(target);
			}
		}
		Self {
			source,
			fragment,
			targets: declared,
			handles: HashMap::new(),
			enabled: false,
		}
	}

	pub fn source(&self) -> &UnitSource {
		&self.source
	}

	pub fn is_derived(&self) -> bool {
		self.source == UnitSource::Derived
	}

	pub fn targets(&self) -> &[Target] {
		&self.targets
	}

	pub fn owns(&self, target: &Target) -> bool {
		self.targets.contains(target)
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Fragment text, if it has been loaded or generated.
	pub fn fragment(&self) -> Option<&str> {
		self.fragment.as_deref()
	}

	/// Replaces the fragment text without touching live handles.
	pub(crate) fn set_fragment(&mut self, fragment: String) {
		self.fragment = Some(fragment);
	}

	/// Live handles on `target`.
	pub fn handles(&self, target: &Target) -> &[InjectionHandle] {
		self.handles.get(target).map_or(&[], Vec::as_slice)
	}

	/// Total number of live handles across all targets.
	pub fn handle_count(&self) -> usize {
		self.handles.values().map(Vec::len).sum()
	}

	async fn load(&mut self) -> Result<String> {
		if let Some(fragment) = &self.fragment {
			return Ok(fragment.clone());
		}
		let UnitSource::File(path) = &self.source else {
			return Err(Error::Validation("derived unit has no generated fragment".into()));
		};
		let fragment = tokio::fs::read_to_string(path).await.map_err(|e| Error::io(path, e))?;
		tracing::debug!(path = %path.display(), "loaded fragment");
		self.fragment = Some(fragment.clone());
		Ok(fragment)
	}

	/// Applies the unit to `target`, or to every declared target in order.
	///
	/// A batch stops at the first failure; targets already applied stay
	/// applied. Asking for a target the unit does not declare is a no-op.
	pub async fn apply(&mut self, host: &dyn Host, target: Option<&Target>) -> Result<()> {
		match target {
			Some(target) => self.apply_to(host, target).await,
			None => {
				for target in self.targets.clone() {
					self.apply_to(host, &target).await?;
				}
				Ok(())
			}
		}
	}

	async fn apply_to(&mut self, host: &dyn Host, target: &Target) -> Result<()> {
		if !self.owns(target) {
			return Ok(());
		}

		if !self.handles(target).is_empty() {
			self.remove_from(host, target).await;
			self.enabled = true;
		}

		let fragment = self.load().await?;
		let id = host.inject_fragment(target, &fragment).await.map_err(|e| Error::Injection {
			target: target.clone(),
			message: e.to_string(),
		})?;

		let handle = InjectionHandle::new(target.clone(), id);
		tracing::info!("+{handle}");
		self.handles.entry(target.clone()).or_default().push(handle);
		self.enabled = true;
		Ok(())
	}

	/// Removes the unit from `target`, or from every declared target.
	///
	/// Host failures are ignored: a reloaded target has already lost the
	/// fragment. Bookkeeping is always cleared. Removing from every target
	/// also clears `enabled`, even when no handle was live.
	pub async fn remove(&mut self, host: &dyn Host, target: Option<&Target>) -> Result<()> {
		match target {
			Some(target) => self.remove_from(host, target).await,
			None => {
				for target in self.targets.clone() {
					self.remove_from(host, &target).await;
				}
				self.enabled = false;
			}
		}
		Ok(())
	}

	async fn remove_from(&mut self, host: &dyn Host, target: &Target) {
		let Some(handles) = self.handles.remove(target) else {
			return;
		};
		if handles.is_empty() {
			return;
		}

		for handle in handles {
			tracing::info!("-{handle}");
			if let Err(error) = host.remove_fragment(target, handle.id()).await {
				tracing::debug!(%target, handle = handle.id(), %error, "ignoring failed fragment removal");
			}
		}
		self.enabled = false;
	}
}
