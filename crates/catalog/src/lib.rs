//! Remote theme catalog.
//!
//! The catalog is a JSON array of entries published next to the theme
//! archives. It is fetched lazily, cached until a forced reload, and used to
//! resolve themes by id or by name for installation into the user theme
//! location.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod error;
mod fetch;

pub use error::{CatalogError, Result};
pub use fetch::{Fetcher, ProcessFetcher};

#[cfg(test)]
mod tests;

/// Public theme database.
pub const DEFAULT_CATALOG_URL: &str = "https://github.com/suchmememanyskill/CssLoader-ThemeDb/releases/download/1.1.0/themes.json";

/// One installable theme. Fields beyond the ones used here are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
	pub id: String,
	pub name: String,
	pub download_url: String,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

pub struct RemoteCatalog {
	url: String,
	themes_dir: PathBuf,
	fetcher: Arc<dyn Fetcher>,
	entries: Vec<CatalogEntry>,
}

impl std::fmt::Debug for RemoteCatalog {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RemoteCatalog")
			.field("url", &self.url)
			.field("themes_dir", &self.themes_dir)
			.field("entries", &self.entries.len())
			.finish_non_exhaustive()
	}
}

impl RemoteCatalog {
	pub fn new(url: impl Into<String>, themes_dir: impl Into<PathBuf>, fetcher: Arc<dyn Fetcher>) -> Self {
		Self {
			url: url.into(),
			themes_dir: themes_dir.into(),
			fetcher,
			entries: Vec::new(),
		}
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn themes_dir(&self) -> &Path {
		&self.themes_dir
	}

	/// Entries from the last successful fetch.
	pub fn entries(&self) -> &[CatalogEntry] {
		&self.entries
	}

	/// Fetches the catalog if nothing is cached yet, or always with `force`.
	///
	/// A failed fetch keeps the previous entries.
	pub async fn load(&mut self, force: bool) -> Result<usize> {
		if force || self.entries.is_empty() {
			let body = self.fetcher.fetch(&self.url).await?;
			self.entries = serde_json::from_slice(&body)?;
			tracing::info!(count = self.entries.len(), "fetched theme catalog");
		}
		Ok(self.entries.len())
	}

	pub async fn entry_by_id(&mut self, id: &str) -> Result<&CatalogEntry> {
		self.load(false).await?;
		self.entries
			.iter()
			.find(|e| e.id == id)
			.ok_or_else(|| CatalogError::NotFound(format!("No theme with id {id} found")))
	}

	pub async fn entry_by_name(&mut self, name: &str) -> Result<&CatalogEntry> {
		self.load(false).await?;
		self.entries
			.iter()
			.find(|e| e.name == name)
			.ok_or_else(|| CatalogError::NotFound(format!("No theme with name {name} found")))
	}

	/// Downloads the archive of entry `id` into a scratch directory and
	/// extracts it into the user theme location.
	pub async fn install(&mut self, id: &str) -> Result<CatalogEntry> {
		let entry = self.entry_by_id(id).await?.clone();

		let staging = tempfile::tempdir().map_err(|error| CatalogError::Io {
			path: std::env::temp_dir(),
			error,
		})?;
		let archive = staging.path().join("theme.zip");
		tracing::info!(theme = %entry.name, url = %entry.download_url, "downloading theme");
		self.fetcher.download(&entry.download_url, &archive).await?;

		tokio::fs::create_dir_all(&self.themes_dir)
			.await
			.map_err(|error| CatalogError::Io {
				path: self.themes_dir.clone(),
				error,
			})?;
		tracing::debug!(archive = %archive.display(), into = %self.themes_dir.display(), "extracting theme");
		self.fetcher.extract(&archive, &self.themes_dir).await?;
		Ok(entry)
	}
}
