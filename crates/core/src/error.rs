//! Error taxonomy for the theme model.

use std::path::PathBuf;

use thiserror::Error;

use crate::Target;

/// Errors raised while parsing, applying or persisting themes.
#[derive(Debug, Error)]
pub enum Error {
	/// Malformed theme, patch or component definition, or an illegal
	/// character in a derived fragment.
	#[error("{0}")]
	Validation(String),

	/// The host failed to apply or remove a fragment.
	#[error("injection into '{target}' failed: {message}")]
	Injection { target: Target, message: String },

	/// Reading or writing a definition or config file failed.
	#[error("I/O error on {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	/// A definition or config file is not valid JSON for its schema.
	#[error("invalid JSON in {path}: {error}")]
	Json { path: PathBuf, error: serde_json::Error },

	/// A directly requested theme, patch or component does not exist.
	#[error("{0}")]
	Dependency(String),
}

impl Error {
	pub(crate) fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
		Self::Io { path: path.into(), error }
	}

	pub(crate) fn json(path: impl Into<PathBuf>, error: serde_json::Error) -> Self {
		Self::Json { path: path.into(), error }
	}
}

/// Result type for theme model operations.
pub type Result<T> = std::result::Result<T, Error>;
