//! Components: sub-values of a patch option that derive one CSS variable.

use serde::Serialize;

use crate::manifest::ComponentDef;
use crate::record::ComponentRecord;
use crate::{Error, Result};

/// Kind of value editor a component exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentKind {
	#[serde(rename = "color-picker")]
	ColorPicker,
}

impl ComponentKind {
	pub fn parse(kind: &str) -> Result<Self> {
		match kind {
			"color-picker" => Ok(Self::ColorPicker),
			other => Err(Error::Validation(format!("unknown component type '{other}'"))),
		}
	}
}

/// A named value bound to one patch option.
///
/// Owns exactly one derived unit in its patch, whose fragment is
/// `:root { --<css_variable>: <value>; }`.
#[derive(Debug, Clone)]
pub struct Component {
	name: String,
	kind: ComponentKind,
	on: String,
	css_variable: String,
	value: String,
	default: String,
	pub(super) unit: usize,
}

impl Component {
	pub(super) fn from_def(def: ComponentDef, unit: usize) -> Result<Self> {
		let kind = ComponentKind::parse(&def.kind)?;
		fragment(&def.css_variable, &def.default)?;
		Ok(Self {
			name: def.name,
			kind,
			on: def.on,
			css_variable: def.css_variable,
			value: def.default.clone(),
			default: def.default,
			unit,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> ComponentKind {
		self.kind
	}

	/// Option this component is active under.
	pub fn on(&self) -> &str {
		&self.on
	}

	pub fn css_variable(&self) -> &str {
		&self.css_variable
	}

	pub fn value(&self) -> &str {
		&self.value
	}

	pub fn default(&self) -> &str {
		&self.default
	}

	/// Fragment text for the current value.
	pub fn fragment(&self) -> Result<String> {
		fragment(&self.css_variable, &self.value)
	}

	/// Validates `value` and stores it, returning the regenerated fragment.
	///
	/// On failure the component is left untouched.
	pub(super) fn set_value(&mut self, value: &str) -> Result<String> {
		let fragment = fragment(&self.css_variable, value)?;
		self.value = value.to_string();
		Ok(fragment)
	}

	pub fn record(&self) -> ComponentRecord {
		ComponentRecord {
			name: self.name.clone(),
			kind: self.kind,
			on: self.on.clone(),
			value: self.value.clone(),
		}
	}
}

/// Builds `:root { --<variable>: <value>; }`.
///
/// Neither part may contain `;`, which would let a value smuggle extra
/// declarations into the fragment.
pub fn fragment(css_variable: &str, value: &str) -> Result<String> {
	if css_variable.contains(';') {
		return Err(Error::Validation(format!("css variable '{css_variable}' contains ';'")));
	}
	if value.contains(';') {
		return Err(Error::Validation(format!("component value '{value}' contains ';'")));
	}
	Ok(format!(":root {{ --{css_variable}: {value}; }}"))
}
