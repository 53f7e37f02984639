//! The loaded theme set and every command that mutates it.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::manifest::MANIFEST_FILE;
use crate::record::ThemeRecord;
use crate::resolve::activation_order;
use crate::{ConfigScope, Error, Host, Result, Target, TargetIndex, Theme};


/// The two places themes are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeLocations {
	/// User-writable themes. Also holds config for bundled themes.
	pub user: PathBuf,
	/// Read-only themes shipped with the application.
	pub bundled: Option<PathBuf>,
}

/// Owner of every loaded [`Theme`].
///
/// Built once at startup; the target/unit index is rebuilt whenever the
/// theme set changes.
pub struct ThemeRegistry {
	host: Arc<dyn Host>,
	locations: ThemeLocations,
	scope: ConfigScope,
	themes: Vec<Theme>,
	index: TargetIndex,
}

impl std::fmt::Debug for ThemeRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ThemeRegistry")
			.field("locations", &self.locations)
			.field("scope", &self.scope)
			.field("themes", &self.themes.len())
			.field("targets", &self.index.targets().len())
			.finish_non_exhaustive()
	}
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

impl ThemeRegistry {
	pub fn new(host: Arc<dyn Host>, locations: ThemeLocations, scope: ConfigScope) -> Self {
		Self {
			host,
			locations,
			scope,
			themes: Vec::new(),
			index: TargetIndex::default(),
		}
	}

	pub fn host(&self) -> &Arc<dyn Host> {
		&self.host
	}

	pub fn locations(&self) -> &ThemeLocations {
		&self.locations
	}

	pub fn themes(&self) -> &[Theme] {
		&self.themes
	}

	pub fn theme(&self, name: &str) -> Option<&Theme> {
		self.themes.iter().find(|t| t.name() == name)
	}

	pub fn index(&self) -> &TargetIndex {
		&self.index
	}

	/// Records for the presentation layer, in the current theme order.
	pub fn records(&self) -> Vec<ThemeRecord> {
		self.themes.iter().map(Theme::record).collect()
	}

	/// Number of units across all themes.
	pub fn unit_count(&self) -> usize {
		self.index.units().len()
	}

	/// Number of units currently flagged enabled.
	pub fn enabled_unit_count(&self) -> usize {
		self.themes.iter().flat_map(Theme::units).filter(|u| u.is_enabled()).count()
	}

	fn position(&self, name: &str) -> Option<usize> {
		self.themes.iter().position(|t| t.name() == name)
	}

	fn require(&self, name: &str) -> Result<usize> {
		self.position(name).ok_or_else(|| Error::Dependency(format!("Did not find theme '{name}'")))
	}

	/// Discards the theme set and parses both locations again.
	///
	/// A theme name already loaded from the user location shadows the same
	/// name in the bundled location. Individual parse failures are logged
	/// and skip only that theme.
	pub async fn load(&mut self) -> Result<()> {
		tracing::info!("loading themes");
		self.themes.clear();

		let user = self.locations.user.clone();
		tokio::fs::create_dir_all(&user).await.map_err(|e| Error::io(&user, e))?;
		self.scan(&user, &user).await?;

		if let Some(bundled) = self.locations.bundled.clone()
			&& tokio::fs::try_exists(&bundled).await.unwrap_or(false)
		{
			self.scan(&bundled, &user).await?;
		}
		Ok(())
	}

	async fn scan(&mut self, themes_dir: &Path, config_root: &Path) -> Result<()> {
		let mut entries = tokio::fs::read_dir(themes_dir).await.map_err(|e| Error::io(themes_dir, e))?;
		let mut names = Vec::new();
		while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io(themes_dir, e))? {
			names.push(entry.file_name());
		}
		names.sort();

		for name in names {
			let theme_dir = themes_dir.join(&name);
			if !tokio::fs::try_exists(theme_dir.join(MANIFEST_FILE)).await.unwrap_or(false) {
				continue;
			}

			tracing::debug!(dir = %theme_dir.display(), "analyzing theme");
			match Theme::load(&theme_dir, &config_root.join(&name), self.scope).await {
				Ok(theme) if self.position(theme.name()).is_some() => {
					tracing::debug!(theme = theme.name(), dir = %theme_dir.display(), "theme already loaded, skipping");
				}
				Ok(theme) => {
					tracing::info!(theme = theme.name(), "adding theme");
					self.themes.push(theme);
				}
				Err(error) => {
					tracing::warn!(dir = %theme_dir.display(), %error, "failed to parse theme");
				}
			}
		}
		Ok(())
	}

	/// Restores persisted state in dependency order, then rebuilds the index
	/// and sorts themes by name.
	pub async fn load_stage2(&mut self) {
		let order = activation_order(
			self.themes
				.iter()
				.map(|t| (t.name(), t.dependencies().keys().map(String::as_str))),
		);
		tracing::debug!(?order, "theme activation order");

		let rank: HashMap<&str, usize> = order.iter().enumerate().map(|(i, name)| (name.as_str(), i)).collect();
		self.themes.sort_by_key(|t| rank.get(t.name()).copied().unwrap_or(usize::MAX));

		for theme in &mut self.themes {
			tracing::debug!(theme = theme.name(), "restoring theme config");
			if let Err(error) = theme.load_config(self.host.as_ref()).await {
				tracing::warn!(theme = theme.name(), %error, "failed to restore theme config");
			}
		}

		self.rebuild_index();
		self.themes.sort_by(|a, b| a.name().cmp(b.name()));
	}

	/// Recomputes the target/unit index from the current theme set.
	pub fn rebuild_index(&mut self) {
		self.index = TargetIndex::build(&self.themes);
	}

	/// Enables or disables a theme.
	///
	/// Enabling first walks the theme's dependencies: each installed
	/// dependency is removed if active, has the forced patch values applied,
	/// and is enabled (recursively) before the requested theme itself.
	pub async fn set_theme_state(&mut self, name: &str, on: bool) -> Result<()> {
		tracing::info!(theme = name, on, "setting theme state");
		if on {
			self.activate(name.to_string(), &mut Vec::new()).await
		} else {
			let index = self.require(name)?;
			self.themes[index].remove(self.host.as_ref()).await
		}
	}

	fn activate<'a>(&'a mut self, name: String, stack: &'a mut Vec<String>) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let index = self.require(&name)?;
			let dependencies = self.themes[index].dependencies().clone();

			stack.push(name.clone());
			for (dependency, forced) in dependencies {
				if stack.contains(&dependency) {
					tracing::warn!(theme = %name, %dependency, "skipping cyclic theme dependency");
					continue;
				}
				let Some(dep_index) = self.position(&dependency) else {
					tracing::debug!(theme = %name, %dependency, "dependency not installed");
					continue;
				};

				let dep = &mut self.themes[dep_index];
				if dep.is_enabled()
					&& let Err(error) = dep.remove(self.host.as_ref()).await
				{
					tracing::warn!(%dependency, %error, "failed to remove dependency before override");
				}
				for (patch_name, value) in &forced {
					if let Some(patch) = dep.patch_mut(patch_name)
						&& let Err(error) = patch.set_value(value)
					{
						tracing::warn!(%dependency, patch = patch.name(), %error, "rejected forced patch value");
					}
				}

				if let Err(error) = self.activate(dependency.clone(), stack).await {
					tracing::warn!(%dependency, %error, "failed to activate dependency");
				}
			}
			stack.pop();

			let index = self.require(&name)?;
			self.themes[index].apply(self.host.as_ref()).await
		})
	}

	/// Selects an option of a patch, reapplying it if the theme is live.
	///
	/// Returns `false` without side effects when the option is already selected.
	pub async fn set_patch_value(&mut self, theme: &str, patch: &str, value: &str) -> Result<bool> {
		let index = self.require(theme)?;
		let host = self.host.as_ref();
		let theme = &mut self.themes[index];
		let enabled = theme.is_enabled();
		let theme_name = theme.name().to_string();
		let target = theme
			.patch_mut(patch)
			.ok_or_else(|| Error::Dependency(format!("Did not find patch '{patch}' for theme '{theme_name}'")))?;

		if target.value() == value {
			return Ok(false);
		}
		if !target.select(value) {
			return Err(Error::Validation(format!("'{value}' is not an option of patch '{patch}'")));
		}
		if enabled {
			target.remove(host).await?;
			target.apply(host).await?;
		}

		theme.save().await?;
		Ok(true)
	}

	/// Sets one component value, reapplying its fragment if live.
	pub async fn set_component_value(&mut self, theme: &str, patch: &str, component: &str, value: &str) -> Result<()> {
		let index = self.require(theme)?;
		let host = self.host.as_ref();
		let theme = &mut self.themes[index];
		let theme_name = theme.name().to_string();
		let target = theme
			.patch_mut(patch)
			.ok_or_else(|| Error::Dependency(format!("Did not find patch '{patch}' for theme '{theme_name}'")))?;

		target.set_component_and_reapply(host, component, value).await?;
		theme.save().await
	}

	/// Removes a non-bundled theme, deletes its assets and drops it.
	pub async fn delete_theme(&mut self, name: &str) -> Result<()> {
		let index = self.require(name)?;
		self.themes[index].delete(self.host.as_ref()).await?;
		self.themes.remove(index);
		self.rebuild_index();
		Ok(())
	}

	/// Removes every live unit, then reloads the whole theme set from disk.
	///
	/// Persisted configs are left untouched, so active themes come back.
	pub async fn reset(&mut self) -> Result<()> {
		let host = self.host.as_ref();
		for theme in &mut self.themes {
			for slot in theme.unit_slots() {
				if let Some(unit) = theme.unit_mut(slot) {
					unit.remove(host, None).await?;
				}
			}
		}

		self.load().await?;
		self.load_stage2().await;
		Ok(())
	}

	/// Reapplies every enabled unit that declares `target`.
	///
	/// Stops at the first failure. Returns the number of units reapplied.
	pub async fn repair_target(&mut self, target: &Target) -> Result<usize> {
		let positions: HashMap<String, usize> = self.themes.iter().enumerate().map(|(i, t)| (t.name().to_string(), i)).collect();
		let host = self.host.as_ref();

		let mut reapplied = 0;
		for unit_ref in self.index.units() {
			let Some(&index) = positions.get(&unit_ref.theme) else {
				continue;
			};
			let Some(unit) = self.themes[index].unit_mut(unit_ref.slot) else {
				continue;
			};
			if unit.is_enabled() && unit.owns(target) {
				unit.apply(host, Some(target)).await?;
				reapplied += 1;
			}
		}
		Ok(reapplied)
	}
}
