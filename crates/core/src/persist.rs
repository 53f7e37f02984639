//! Per-theme persisted configuration.
//!
//! Each theme keeps one JSON record `{"active": bool, "<patch>": <value>, ...}`
//! in its config directory. The file name depends on whether the process runs
//! privileged, so root and user sessions never clobber each other.

use std::io::ErrorKind;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, PatchValue, Result};

/// Execution context that selects the config file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigScope {
	Privileged,
	Unprivileged,
}

impl ConfigScope {
	/// Scope of the current process, from its effective uid.
	pub fn detect() -> Self {
		if rustix::process::geteuid().is_root() {
			Self::Privileged
		} else {
			Self::Unprivileged
		}
	}

	pub const fn file_name(self) -> &'static str {
		match self {
			Self::Privileged => "config_ROOT.json",
			Self::Unprivileged => "config_USER.json",
		}
	}
}

/// Persisted state of one theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
	#[serde(default)]
	pub active: bool,
	#[serde(flatten)]
	pub patches: IndexMap<String, PatchValue>,
}

impl ThemeConfig {
	/// Reads a config record. A missing file yields `None`.
	pub async fn read(path: &Path) -> Result<Option<Self>> {
		let input = match tokio::fs::read_to_string(path).await {
			Ok(input) => input,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(Error::io(path, e)),
		};
		serde_json::from_str(&input).map(Some).map_err(|e| Error::json(path, e))
	}

	/// Rewrites the whole record, creating the parent directory if needed.
	pub async fn write(&self, path: &Path) -> Result<()> {
		if let Some(dir) = path.parent() {
			tokio::fs::create_dir_all(dir).await.map_err(|e| Error::io(dir, e))?;
		}
		let output = serde_json::to_string(self).map_err(|e| Error::json(path, e))?;
		tokio::fs::write(path, output).await.map_err(|e| Error::io(path, e))
	}
}
