//! Daemon settings, read from a TOML file.
//!
//! Every field has a default, so an empty or missing file is valid:
//!
//! ```toml
//! themes_dir = "/home/deck/homebrew/themes"
//! bundled_dir = "/usr/share/lacquer/themes"
//! config_scope = "auto"
//!
//! [reconcile]
//! interval_ms = 3000
//! marker_attempts = 3
//! marker_delay_ms = 1000
//!
//! [startup]
//! primary_target = "SP"
//! marker_attempts = 9999
//!
//! [catalog]
//! url = "https://example.org/themes.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use lacquer_catalog::DEFAULT_CATALOG_URL;
use lacquer_core::{ConfigScope, Target, ThemeLocations};
use lacquer_worker::{ReconcileConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("failed to read {path}: {error}")]
	Io {
		path: PathBuf,
		#[source]
		error: std::io::Error,
	},
	#[error("invalid settings in {path}: {error}")]
	Parse {
		path: PathBuf,
		#[source]
		error: toml::de::Error,
	},
	#[error("invalid settings in {path}: {message}")]
	Invalid { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	/// User-writable theme location. Also holds config for bundled themes.
	pub themes_dir: PathBuf,
	/// Read-only themes shipped alongside the daemon.
	pub bundled_dir: Option<PathBuf>,
	pub config_scope: ScopeSetting,
	pub reconcile: ReconcileSettings,
	pub startup: StartupSettings,
	pub catalog: CatalogSettings,
}

/// Which persisted config file name to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeSetting {
	/// Decide from the effective uid.
	#[default]
	Auto,
	Privileged,
	Unprivileged,
}

impl ScopeSetting {
	pub fn resolve(self) -> ConfigScope {
		match self {
			Self::Auto => ConfigScope::detect(),
			Self::Privileged => ConfigScope::Privileged,
			Self::Unprivileged => ConfigScope::Unprivileged,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileSettings {
	pub interval_ms: u64,
	pub marker_attempts: u32,
	pub marker_delay_ms: u64,
}

impl Default for ReconcileSettings {
	fn default() -> Self {
		Self {
			interval_ms: 3000,
			marker_attempts: 3,
			marker_delay_ms: 1000,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StartupSettings {
	/// Target whose marker must exist before persisted themes are applied.
	pub primary_target: String,
	pub marker_attempts: u32,
}

impl Default for StartupSettings {
	fn default() -> Self {
		Self {
			primary_target: "SP".into(),
			marker_attempts: 9999,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSettings {
	pub url: String,
}

impl Default for CatalogSettings {
	fn default() -> Self {
		Self {
			url: DEFAULT_CATALOG_URL.into(),
		}
	}
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			themes_dir: dirs::home_dir().unwrap_or_default().join("homebrew").join("themes"),
			bundled_dir: None,
			config_scope: ScopeSetting::Auto,
			reconcile: ReconcileSettings::default(),
			startup: StartupSettings::default(),
			catalog: CatalogSettings::default(),
		}
	}
}

impl Settings {
	/// `$XDG_CONFIG_HOME/lacquer/config.toml` (or the platform equivalent).
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("lacquer").join("config.toml"))
	}

	pub fn parse(input: &str, path: &Path) -> Result<Self, SettingsError> {
		let settings: Self = toml::from_str(input).map_err(|error| SettingsError::Parse {
			path: path.to_path_buf(),
			error,
		})?;
		if settings.reconcile.interval_ms == 0 {
			return Err(SettingsError::Invalid {
				path: path.to_path_buf(),
				message: "reconcile.interval_ms must be greater than zero".into(),
			});
		}
		Ok(settings)
	}

	/// Loads settings from `explicit`, or from [`Self::default_path`].
	///
	/// An explicit path must exist. A missing default file yields defaults.
	pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
		let (path, required) = match explicit {
			Some(path) => (path.to_path_buf(), true),
			None => match Self::default_path() {
				Some(path) => (path, false),
				None => return Ok(Self::default()),
			},
		};

		match std::fs::read_to_string(&path) {
			Ok(input) => {
				tracing::debug!(path = %path.display(), "loading settings");
				Self::parse(&input, &path)
			}
			Err(error) if !required && error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
			Err(error) => Err(SettingsError::Io { path, error }),
		}
	}

	pub fn locations(&self) -> ThemeLocations {
		ThemeLocations {
			user: self.themes_dir.clone(),
			bundled: self.bundled_dir.clone(),
		}
	}

	pub fn primary_target(&self) -> Target {
		Target::new(self.startup.primary_target.clone())
	}

	pub fn marker_delay(&self) -> Duration {
		Duration::from_millis(self.reconcile.marker_delay_ms)
	}

	pub fn startup_policy(&self) -> RetryPolicy {
		RetryPolicy::new(self.startup.marker_attempts, self.marker_delay())
	}

	pub fn reconcile_config(&self) -> ReconcileConfig {
		ReconcileConfig {
			interval: Duration::from_millis(self.reconcile.interval_ms),
			marker: RetryPolicy::new(self.reconcile.marker_attempts, self.marker_delay()),
		}
	}
}
