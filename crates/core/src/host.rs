//! Boundary to the environment that owns the render surfaces.
//!
//! The model never touches targets directly: fragment injection, removal and
//! liveness markers all go through a [`Host`].

use async_trait::async_trait;
use thiserror::Error;

use crate::Target;

mod memory;

pub use memory::MemoryHost;

/// Failure reported by a [`Host`] call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

/// Capabilities consumed from the host environment.
#[async_trait]
pub trait Host: Send + Sync {
	/// Injects `source` into `target`, returning the opaque handle id.
	async fn inject_fragment(&self, target: &Target, source: &str) -> Result<String, HostError>;

	/// Removes a previously injected fragment.
	async fn remove_fragment(&self, target: &Target, id: &str) -> Result<(), HostError>;

	/// Returns whether `target` still carries the liveness marker.
	async fn has_marker(&self, target: &Target) -> Result<bool, HostError>;

	/// Creates the liveness marker on `target`.
	async fn create_marker(&self, target: &Target) -> Result<(), HostError>;
}
