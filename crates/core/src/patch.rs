//! Patches: mutually exclusive option groups within a theme.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::manifest::PatchDef;
use crate::record::PatchRecord;
use crate::{Error, Host, PatchValue, Result, Unit};

mod component;

pub use component::{Component, ComponentKind, fragment};

#[cfg(test)]
mod tests;

/// How the presentation layer renders a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
	Dropdown,
	Checkbox,
	Slider,
}

impl PatchKind {
	/// Resolves a declared kind against the available options.
	///
	/// Unknown kinds become [`Dropdown`](Self::Dropdown), as does a checkbox
	/// whose options are not exactly `No` and `Yes`.
	pub fn resolve<'a>(declared: &str, options: impl IntoIterator<Item = &'a str>) -> Self {
		match declared {
			"slider" => Self::Slider,
			"checkbox" => {
				let mut options: Vec<_> = options.into_iter().collect();
				options.sort_unstable();
				if options == ["No", "Yes"] { Self::Checkbox } else { Self::Dropdown }
			}
			_ => Self::Dropdown,
		}
	}
}

/// Which `theme.json` encoding a patch was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchEncoding {
	/// Options listed as siblings of `default`.
	Legacy,
	/// Options nested under `values`.
	Current,
}

/// A named choice among options, each backed by zero or more units.
#[derive(Debug, Clone)]
pub struct Patch {
	name: String,
	theme: String,
	default: String,
	value: String,
	declared_kind: String,
	kind: PatchKind,
	encoding: PatchEncoding,
	units: Vec<Unit>,
	options: IndexMap<String, Vec<usize>>,
	components: Vec<Component>,
}

impl Patch {
	/// Builds a patch for `theme`, resolving fragment files against `theme_dir`.
	pub fn from_def(theme: &str, theme_dir: &Path, def: PatchDef) -> Result<Self> {
		let mut units = Vec::new();
		let mut options: IndexMap<String, Vec<usize>> = IndexMap::new();

		for (option, fragments) in def.options {
			let slots = options.entry(option).or_default();
			for (file, targets) in fragments {
				slots.push(units.len());
				units.push(Unit::from_file(theme_dir.join(file), targets));
			}
		}

		let mut components = Vec::new();
		for component_def in def.components {
			let Some(slots) = options.get_mut(&component_def.on) else {
				return Err(Error::Validation(format!(
					"component '{}' of patch '{}' references non-existent value '{}'",
					component_def.name, def.name, component_def.on
				)));
			};
			let targets = component_def.tabs.clone();
			let component = Component::from_def(component_def, units.len())?;
			slots.push(units.len());
			units.push(Unit::derived(component.fragment()?, targets));
			components.push(component);
		}

		let mut patch = Self {
			kind: PatchKind::Dropdown,
			name: def.name,
			theme: theme.to_string(),
			value: def.default.clone(),
			default: def.default,
			declared_kind: def.kind,
			encoding: def.encoding,
			units,
			options,
			components,
		};
		patch.check_value();
		Ok(patch)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn default(&self) -> &str {
		&self.default
	}

	/// Currently selected option.
	pub fn value(&self) -> &str {
		&self.value
	}

	pub fn kind(&self) -> PatchKind {
		self.kind
	}

	pub fn encoding(&self) -> PatchEncoding {
		self.encoding
	}

	/// Option names in declaration order.
	pub fn options(&self) -> impl Iterator<Item = &str> {
		self.options.keys().map(String::as_str)
	}

	pub fn has_option(&self, option: &str) -> bool {
		self.options.contains_key(option)
	}

	pub fn components(&self) -> &[Component] {
		&self.components
	}

	pub fn component(&self, name: &str) -> Option<&Component> {
		self.components.iter().find(|c| c.name() == name)
	}

	/// Every unit the patch owns, across all options.
	pub fn units(&self) -> &[Unit] {
		&self.units
	}

	pub fn unit_mut(&mut self, index: usize) -> Option<&mut Unit> {
		self.units.get_mut(index)
	}

	/// Units registered under `option`, in declaration order.
	pub fn option_units(&self, option: &str) -> impl Iterator<Item = &Unit> {
		self.options.get(option).into_iter().flatten().map(|&i| &self.units[i])
	}

	/// Resets an unknown selection to the default and normalizes the kind.
	pub fn check_value(&mut self) {
		if !self.options.contains_key(&self.value) {
			self.value = self.default.clone();
		}
		self.kind = PatchKind::resolve(&self.declared_kind, self.options.keys().map(String::as_str));
	}

	/// Selects `option` if it exists. Returns whether the selection changed.
	pub fn select(&mut self, option: &str) -> bool {
		if self.value == option || !self.has_option(option) {
			return false;
		}
		self.value = option.to_string();
		true
	}

	/// Applies a bare or structured value.
	///
	/// Unknown component names are ignored. Known components are validated
	/// first; if any value is rejected nothing is changed. Fragments are
	/// regenerated but not reapplied.
	pub fn set_value(&mut self, value: &PatchValue) -> Result<()> {
		let mut updates = Vec::new();
		for (name, component_value) in value.components() {
			let Some(index) = self.components.iter().position(|c| c.name() == name) else {
				continue;
			};
			fragment(self.components[index].css_variable(), component_value)?;
			updates.push((index, component_value));
		}

		if let Some(selection) = value.selection() {
			self.value = selection.to_string();
		}
		for (index, component_value) in updates {
			self.regenerate(index, component_value)?;
		}
		self.check_value();
		Ok(())
	}

	/// Bare value without components, structured payload otherwise.
	pub fn get_value(&self) -> PatchValue {
		if self.components.is_empty() {
			return PatchValue::Simple(self.value.clone());
		}
		PatchValue::WithComponents {
			value: Some(self.value.clone()),
			components: self
				.components
				.iter()
				.map(|c| (c.name().to_string(), c.value().to_string()))
				.collect(),
		}
	}

	fn regenerate(&mut self, index: usize, value: &str) -> Result<()> {
		let component = &mut self.components[index];
		let fragment = component.set_value(value)?;
		let unit = component.unit;
		self.units[unit].set_fragment(fragment);
		Ok(())
	}

	fn component_index(&self, name: &str) -> Result<usize> {
		self.components
			.iter()
			.position(|c| c.name() == name)
			.ok_or_else(|| Error::Dependency(format!("Failed to find component '{name}'")))
	}

	/// Sets one component and regenerates its fragment without reapplying.
	pub fn set_component(&mut self, name: &str, value: &str) -> Result<()> {
		let index = self.component_index(name)?;
		self.regenerate(index, value)
	}

	/// Sets one component, then reapplies its unit if that unit is live.
	pub async fn set_component_and_reapply(&mut self, host: &dyn Host, name: &str, value: &str) -> Result<()> {
		let index = self.component_index(name)?;
		self.regenerate(index, value)?;
		let unit = &mut self.units[self.components[index].unit];
		if unit.is_enabled() {
			unit.apply(host, None).await?;
		}
		Ok(())
	}

	/// Applies every unit of the selected option, stopping at the first failure.
	pub async fn apply(&mut self, host: &dyn Host) -> Result<()> {
		self.check_value();
		tracing::info!(theme = %self.theme, patch = %self.name, value = %self.value, "applying patch");
		let selected = self.options.get(&self.value).cloned().unwrap_or_default();
		for index in selected {
			self.units[index].apply(host, None).await?;
		}
		Ok(())
	}

	/// Removes every unit of every option.
	pub async fn remove(&mut self, host: &dyn Host) -> Result<()> {
		self.check_value();
		tracing::info!(theme = %self.theme, patch = %self.name, "removing patch");
		for unit in &mut self.units {
			unit.remove(host, None).await?;
		}
		Ok(())
	}

	pub fn record(&self) -> PatchRecord {
		PatchRecord {
			name: self.name.clone(),
			default: self.default.clone(),
			value: self.value.clone(),
			options: self.options.keys().cloned().collect(),
			kind: self.kind,
			components: self.components.iter().map(Component::record).collect(),
		}
	}
}
