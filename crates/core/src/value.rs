//! Patch selections as stored in config files and sent by the presentation layer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value of a patch: either a bare option name, or an option name together
/// with component values.
///
/// A structured payload without `value` only updates components and keeps
/// the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatchValue {
	Simple(String),
	WithComponents {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		value: Option<String>,
		#[serde(default)]
		components: IndexMap<String, String>,
	},
}

impl PatchValue {
	/// The selected option, if the payload carries one.
	pub fn selection(&self) -> Option<&str> {
		match self {
			Self::Simple(value) => Some(value),
			Self::WithComponents { value, .. } => value.as_deref(),
		}
	}

	/// Component values carried by the payload.
	pub fn components(&self) -> impl Iterator<Item = (&str, &str)> {
		let components = match self {
			Self::Simple(_) => None,
			Self::WithComponents { components, .. } => Some(components),
		};
		components.into_iter().flatten().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

impl From<&str> for PatchValue {
	fn from(value: &str) -> Self {
		Self::Simple(value.to_string())
	}
}
