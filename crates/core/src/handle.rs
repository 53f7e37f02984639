//! Targets and the handles issued for fragments applied to them.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An addressable render surface, referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Target {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for Target {
	fn from(name: String) -> Self {
		Self(name)
	}
}

impl Borrow<str> for Target {
	fn borrow(&self) -> &str {
		&self.0
	}
}

/// One fragment applied to one target.
///
/// The id is opaque and only meaningful to the [`Host`](crate::Host) that
/// issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InjectionHandle {
	target: Target,
	id: String,
}

impl InjectionHandle {
	pub fn new(target: Target, id: impl Into<String>) -> Self {
		Self { target, id: id.into() }
	}

	pub fn target(&self) -> &Target {
		&self.target
	}

	pub fn id(&self) -> &str {
		&self.id
	}
}

impl fmt::Display for InjectionHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} @ {}", self.id, self.target)
	}
}
