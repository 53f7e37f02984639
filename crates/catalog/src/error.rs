use std::path::PathBuf;

use thiserror::Error;

/// Failures while fetching the catalog or installing from it.
#[derive(Debug, Error)]
pub enum CatalogError {
	#[error("`{command}` exited with error code {code:?}: {stderr}")]
	Process { command: String, code: Option<i32>, stderr: String },
	#[error("failed to start `{command}`: {error}")]
	Spawn {
		command: String,
		#[source]
		error: std::io::Error,
	},
	#[error("invalid catalog data: {0}")]
	Json(#[from] serde_json::Error),
	#[error("{0}")]
	NotFound(String),
	#[error("I/O error on {path}: {error}")]
	Io {
		path: PathBuf,
		#[source]
		error: std::io::Error,
	},
}

pub type Result<T> = std::result::Result<T, CatalogError>;
