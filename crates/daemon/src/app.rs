//! Application state and the command interface.
//!
//! [`App::start`] runs the one-time startup sequence; afterwards every
//! command takes the registry lock for its whole duration and reports an
//! [`Outcome`] rather than an error.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use lacquer_catalog::{CatalogEntry, CatalogError, Fetcher, RemoteCatalog};
use lacquer_core::manifest::{MANIFEST_FILE, ThemeManifest};
use lacquer_core::{BACKEND_VERSION, Host, Outcome, ThemeRecord, ThemeRegistry};
use lacquer_worker::{Reconciler, ReconcilerHandle, TaskClass, establish_marker};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::Settings;


/// Failure of a command that spans the registry and the catalog.
#[derive(Debug, Error)]
enum CommandError {
	#[error(transparent)]
	Core(#[from] lacquer_core::Error),
	#[error(transparent)]
	Catalog(#[from] CatalogError),
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub struct App {
	settings: Settings,
	registry: Arc<Mutex<ThemeRegistry>>,
	catalog: Mutex<RemoteCatalog>,
	reconciler: ReconcilerHandle,
}

impl std::fmt::Debug for App {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("App")
			.field("settings", &self.settings)
			.field("reconciler", &self.reconciler)
			.finish_non_exhaustive()
	}
}

impl App {
	/// Loads every theme, restores persisted state and starts reconciling.
	///
	/// The catalog is fetched on a separate task while themes load.
	///
	/// The reconciliation loop stops when `cancel` fires or the app is
	/// dropped. Only failing to prepare the user theme location is fatal.
	pub async fn start(
		settings: Settings,
		host: Arc<dyn Host>,
		fetcher: Arc<dyn Fetcher>,
		cancel: CancellationToken,
	) -> lacquer_core::Result<Self> {
		tracing::info!("initializing lacquer");

		let mut catalog = RemoteCatalog::new(settings.catalog.url.clone(), settings.themes_dir.clone(), Arc::clone(&fetcher));
		let prefetch = lacquer_worker::spawn(TaskClass::Fetch, async move {
			if let Err(error) = catalog.load(false).await {
				tracing::warn!(%error, "theme catalog unavailable");
			}
			catalog
		});

		let scope = settings.config_scope.resolve();
		let mut registry = ThemeRegistry::new(Arc::clone(&host), settings.locations(), scope);
		let loaded = registry.load().await;
		let catalog = match prefetch.await {
			Ok(catalog) => catalog,
			Err(error) => {
				tracing::warn!(%error, "catalog prefetch aborted");
				RemoteCatalog::new(settings.catalog.url.clone(), settings.themes_dir.clone(), fetcher)
			}
		};
		loaded?;

		let primary = settings.primary_target();
		if let Err(error) = establish_marker(host.as_ref(), &primary, settings.startup_policy()).await {
			tracing::warn!(%primary, %error, "primary target has no marker");
		}
		registry.load_stage2().await;

		let targets: Vec<String> = registry.index().targets().map(ToString::to_string).collect();
		tracing::info!(
			themes = registry.themes().len(),
			?targets,
			units = registry.unit_count(),
			live = registry.enabled_unit_count(),
			"initialized lacquer"
		);

		let registry = Arc::new(Mutex::new(registry));
		let reconciler = Reconciler::new(Arc::clone(&registry), host, settings.reconcile_config()).spawn(cancel.child_token());

		Ok(Self {
			settings,
			registry,
			catalog: Mutex::new(catalog),
			reconciler,
		})
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn registry(&self) -> &Arc<Mutex<ThemeRegistry>> {
		&self.registry
	}

	pub fn backend_version(&self) -> u32 {
		BACKEND_VERSION
	}

	pub async fn get_themes(&self) -> Vec<ThemeRecord> {
		self.registry.lock().await.records()
	}

	pub async fn set_theme_state(&self, name: &str, on: bool) -> Outcome {
		self.registry.lock().await.set_theme_state(name, on).await.into()
	}

	pub async fn set_patch_of_theme(&self, theme: &str, patch: &str, value: &str) -> Outcome {
		match self.registry.lock().await.set_patch_value(theme, patch, value).await {
			Ok(true) => Outcome::ok(),
			Ok(false) => Outcome::ok_with("Already injected"),
			Err(error) => Outcome::failed(error.to_string()),
		}
	}

	pub async fn set_component_of_theme_patch(&self, theme: &str, patch: &str, component: &str, value: &str) -> Outcome {
		self.registry
			.lock()
			.await
			.set_component_value(theme, patch, component, value)
			.await
			.into()
	}

	pub async fn delete_theme(&self, name: &str) -> Outcome {
		self.registry.lock().await.delete_theme(name).await.into()
	}

	/// Removes everything live and reloads the theme set from disk.
	pub async fn reset(&self) -> Outcome {
		self.registry.lock().await.reset().await.into()
	}

	pub async fn get_theme_db_data(&self) -> Vec<CatalogEntry> {
		self.catalog.lock().await.entries().to_vec()
	}

	pub async fn reload_theme_db_data(&self) -> Outcome {
		self.catalog.lock().await.load(true).await.map(drop).into()
	}

	/// Installs catalog entry `id`, then every dependency it declares that is
	/// not loaded yet, looked up in the catalog by name.
	///
	/// Installed themes show up after the next [`App::reset`].
	pub async fn download_theme(&self, id: &str) -> Outcome {
		self.download(id.to_string(), &mut Vec::new()).await.into()
	}

	fn download<'a>(&'a self, id: String, visiting: &'a mut Vec<String>) -> BoxFuture<'a, Result<(), CommandError>> {
		Box::pin(async move {
			if visiting.contains(&id) {
				tracing::warn!(%id, "skipping cyclic theme download");
				return Ok(());
			}
			visiting.push(id.clone());

			let entry = self.catalog.lock().await.install(&id).await?;
			let theme_dir = self.settings.themes_dir.join(&entry.name);
			if !tokio::fs::try_exists(theme_dir.join(MANIFEST_FILE)).await.unwrap_or(false) {
				tracing::debug!(theme = %entry.name, "installed archive has no theme definition");
				return Ok(());
			}

			let manifest = ThemeManifest::load(&theme_dir).await?;
			for dependency in manifest.dependencies.keys() {
				if self.registry.lock().await.theme(dependency).is_some() {
					continue;
				}
				let dependency_id = self.catalog.lock().await.entry_by_name(dependency).await?.id.clone();
				tracing::info!(theme = %entry.name, %dependency, "installing missing dependency");
				self.download(dependency_id, visiting).await?;
			}
			Ok(())
		})
	}

	/// Stops the reconciliation loop and waits for it.
	pub async fn shutdown(self) {
		self.reconciler.shutdown().await;
	}
}
