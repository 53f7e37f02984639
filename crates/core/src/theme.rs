//! Themes: top-level units, patches, dependencies and the enabled flag.

use std::path::{Path, PathBuf};

use crate::manifest::{DependencyMap, ThemeManifest};
use crate::record::ThemeRecord;
use crate::targets::UnitSlot;
use crate::{ConfigScope, Error, Host, Patch, Result, ThemeConfig, Unit};

/// A loaded theme.
///
/// A theme whose config directory differs from its asset directory is
/// *bundled*: it ships read-only with the application and cannot be deleted.
#[derive(Debug, Clone)]
pub struct Theme {
	name: String,
	version: String,
	author: String,
	require: u32,
	theme_dir: PathBuf,
	config_dir: PathBuf,
	config_file: PathBuf,
	dependencies: DependencyMap,
	units: Vec<Unit>,
	patches: Vec<Patch>,
	enabled: bool,
}

impl Theme {
	/// Reads `theme.json` from `theme_dir` and builds the theme.
	pub async fn load(theme_dir: &Path, config_dir: &Path, scope: ConfigScope) -> Result<Self> {
		let manifest = ThemeManifest::load(theme_dir).await?;
		Self::from_manifest(manifest, theme_dir, config_dir, scope)
	}

	pub fn from_manifest(manifest: ThemeManifest, theme_dir: &Path, config_dir: &Path, scope: ConfigScope) -> Result<Self> {
		let units = manifest
			.inject
			.into_iter()
			.map(|(file, targets)| Unit::from_file(theme_dir.join(file), targets))
			.collect();
		let patches = manifest
			.patches
			.into_iter()
			.map(|def| Patch::from_def(&manifest.name, theme_dir, def))
			.collect::<Result<Vec<_>>>()?;

		Ok(Self {
			name: manifest.name,
			version: manifest.version,
			author: manifest.author,
			require: manifest.require,
			theme_dir: theme_dir.to_path_buf(),
			config_dir: config_dir.to_path_buf(),
			config_file: config_dir.join(scope.file_name()),
			dependencies: manifest.dependencies,
			units,
			patches,
			enabled: false,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn version(&self) -> &str {
		&self.version
	}

	pub fn author(&self) -> &str {
		&self.author
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn is_bundled(&self) -> bool {
		self.config_dir != self.theme_dir
	}

	pub fn theme_dir(&self) -> &Path {
		&self.theme_dir
	}

	pub fn config_file(&self) -> &Path {
		&self.config_file
	}

	/// Depended-upon theme names mapped to the patch values forced on them.
	pub fn dependencies(&self) -> &DependencyMap {
		&self.dependencies
	}

	/// Top-level units, outside any patch.
	pub fn top_level_units(&self) -> &[Unit] {
		&self.units
	}

	pub fn patches(&self) -> &[Patch] {
		&self.patches
	}

	pub fn patch(&self, name: &str) -> Option<&Patch> {
		self.patches.iter().find(|p| p.name() == name)
	}

	pub fn patch_mut(&mut self, name: &str) -> Option<&mut Patch> {
		self.patches.iter_mut().find(|p| p.name() == name)
	}

	/// Every unit the theme owns: top-level first, then each patch's units.
	pub fn units(&self) -> impl Iterator<Item = &Unit> {
		self.units.iter().chain(self.patches.iter().flat_map(|p| p.units()))
	}

	/// Addresses of every unit, in the same order as [`Self::units`].
	pub fn unit_slots(&self) -> Vec<UnitSlot> {
		let top = (0..self.units.len()).map(UnitSlot::TopLevel);
		let patched = self
			.patches
			.iter()
			.enumerate()
			.flat_map(|(patch, p)| (0..p.units().len()).map(move |unit| UnitSlot::Patch { patch, unit }));
		top.chain(patched).collect()
	}

	pub fn unit_mut(&mut self, slot: UnitSlot) -> Option<&mut Unit> {
		match slot {
			UnitSlot::TopLevel(index) => self.units.get_mut(index),
			UnitSlot::Patch { patch, unit } => self.patches.get_mut(patch)?.unit_mut(unit),
		}
	}

	/// Restores patch values from the persisted config and applies the
	/// theme if it was active. A missing config leaves defaults, inactive.
	pub async fn load_config(&mut self, host: &dyn Host) -> Result<()> {
		let Some(config) = ThemeConfig::read(&self.config_file).await? else {
			return Ok(());
		};

		for (name, value) in &config.patches {
			if let Some(patch) = self.patch_mut(name)
				&& let Err(error) = patch.set_value(value)
			{
				tracing::warn!(theme = %self.name, patch = %name, %error, "ignoring persisted patch value");
			}
		}

		if config.active {
			self.apply(host).await?;
		}
		Ok(())
	}

	/// Rewrites the persisted config from the current state.
	pub async fn save(&self) -> Result<()> {
		let config = ThemeConfig {
			active: self.enabled,
			patches: self.patches.iter().map(|p| (p.name().to_string(), p.get_value())).collect(),
		};
		config.write(&self.config_file).await
	}

	async fn save_logged(&self) {
		if let Err(error) = self.save().await {
			tracing::warn!(theme = %self.name, %error, "failed to save theme config");
		}
	}

	/// Applies top-level units, then every patch's selected option.
	pub async fn apply(&mut self, host: &dyn Host) -> Result<()> {
		tracing::info!(theme = %self.name, "applying theme");
		for unit in &mut self.units {
			unit.apply(host, None).await?;
		}
		for patch in &mut self.patches {
			patch.apply(host).await?;
		}

		self.enabled = true;
		self.save_logged().await;
		Ok(())
	}

	/// Removes every unit the theme owns.
	pub async fn remove(&mut self, host: &dyn Host) -> Result<()> {
		tracing::info!(theme = %self.name, "removing theme");
		for unit in &mut self.units {
			unit.remove(host, None).await?;
		}
		for patch in &mut self.patches {
			patch.remove(host).await?;
		}

		self.enabled = false;
		self.save_logged().await;
		Ok(())
	}

	/// Removes the theme and deletes its assets. Bundled themes are refused.
	pub async fn delete(&mut self, host: &dyn Host) -> Result<()> {
		if self.is_bundled() {
			return Err(Error::Validation("Can't delete a bundled theme".into()));
		}
		self.remove(host).await?;
		tokio::fs::remove_dir_all(&self.theme_dir)
			.await
			.map_err(|e| Error::io(&self.theme_dir, e))
	}

	pub fn record(&self) -> ThemeRecord {
		ThemeRecord {
			name: self.name.clone(),
			version: self.version.clone(),
			author: self.author.clone(),
			enabled: self.enabled,
			bundled: self.is_bundled(),
			require: self.require,
			dependencies: self.dependencies.keys().cloned().collect(),
			patches: self.patches.iter().map(Patch::record).collect(),
		}
	}
}
