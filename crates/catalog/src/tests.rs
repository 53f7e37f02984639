use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

/// Serves the catalog and archives from memory. An "archive" is the URL it
/// was downloaded from; extracting it writes the files registered for it.
#[derive(Default)]
struct FakeFetcher {
	catalog: String,
	archives: HashMap<String, Vec<(&'static str, &'static str)>>,
	fetches: AtomicUsize,
}

#[async_trait]
impl Fetcher for FakeFetcher {
	async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
		self.fetches.fetch_add(1, Ordering::SeqCst);
		if url == "https://catalog.invalid/themes.json" {
			Ok(self.catalog.clone().into_bytes())
		} else {
			Err(CatalogError::Process {
				command: format!("curl {url}"),
				code: Some(22),
				stderr: "404".into(),
			})
		}
	}

	async fn download(&self, url: &str, dest: &Path) -> Result<()> {
		std::fs::write(dest, url).map_err(|error| CatalogError::Io {
			path: dest.to_path_buf(),
			error,
		})
	}

	async fn extract(&self, archive: &Path, into: &Path) -> Result<()> {
		let url = std::fs::read_to_string(archive).unwrap();
		for (file, contents) in &self.archives[&url] {
			let path = into.join(file);
			std::fs::create_dir_all(path.parent().unwrap()).unwrap();
			std::fs::write(path, contents).unwrap();
		}
		Ok(())
	}
}

fn fetcher() -> Arc<FakeFetcher> {
	let catalog = json!([
		{"id": "1", "name": "Glass", "download_url": "https://dl.invalid/glass.zip", "author": "a", "tags": ["x"]},
		{"id": "2", "name": "Frost", "download_url": "https://dl.invalid/frost.zip"}
	]);
	let mut archives = HashMap::new();
	archives.insert(
		"https://dl.invalid/glass.zip".to_string(),
		vec![("Glass/theme.json", r#"{"name": "Glass"}"#), ("Glass/a.css", "/* a */")],
	);
	Arc::new(FakeFetcher {
		catalog: catalog.to_string(),
		archives,
		fetches: AtomicUsize::new(0),
	})
}

fn catalog(fetcher: &Arc<FakeFetcher>, dir: &Path) -> RemoteCatalog {
	RemoteCatalog::new(
		"https://catalog.invalid/themes.json",
		dir,
		Arc::clone(fetcher) as Arc<dyn Fetcher>,
	)
}

#[tokio::test]
async fn load_fetches_once_unless_forced() {
	let fetcher = fetcher();
	let mut catalog = catalog(&fetcher, Path::new("/nonexistent"));

	assert_eq!(catalog.load(false).await.unwrap(), 2);
	catalog.load(false).await.unwrap();
	assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);

	catalog.load(true).await.unwrap();
	assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unknown_fields_survive() {
	let fetcher = fetcher();
	let mut catalog = catalog(&fetcher, Path::new("/nonexistent"));

	let entry = catalog.entry_by_name("Glass").await.unwrap();

	assert_eq!(entry.id, "1");
	assert_eq!(entry.extra["author"], json!("a"));
	assert_eq!(serde_json::to_value(entry).unwrap()["tags"], json!(["x"]));
}

#[tokio::test]
async fn lookups_report_missing_entries() {
	let fetcher = fetcher();
	let mut catalog = catalog(&fetcher, Path::new("/nonexistent"));

	let err = catalog.entry_by_id("9").await.unwrap_err();
	assert_eq!(err.to_string(), "No theme with id 9 found");
	let err = catalog.entry_by_name("Nope").await.unwrap_err();
	assert_eq!(err.to_string(), "No theme with name Nope found");
}

#[tokio::test]
async fn failed_fetch_keeps_previous_entries() {
	let fetcher = fetcher();
	let mut catalog = catalog(&fetcher, Path::new("/nonexistent"));
	catalog.load(false).await.unwrap();
	catalog.url = "https://catalog.invalid/moved.json".into();

	assert!(matches!(catalog.load(true).await, Err(CatalogError::Process { code: Some(22), .. })));
	assert_eq!(catalog.entries().len(), 2);
}

#[tokio::test]
async fn install_extracts_into_theme_location() {
	let dir = tempfile::tempdir().unwrap();
	let themes = dir.path().join("themes");
	let fetcher = fetcher();
	let mut catalog = catalog(&fetcher, &themes);

	let entry = catalog.install("1").await.unwrap();

	assert_eq!(entry.name, "Glass");
	assert_eq!(std::fs::read_to_string(themes.join("Glass/a.css")).unwrap(), "/* a */");
	assert!(themes.join("Glass/theme.json").exists());
}
