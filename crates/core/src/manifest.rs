//! Theme definition (`theme.json`) parsing.
//!
//! Patches come in two encodings. The current one nests options under
//! `values`; the legacy one lists options as sibling keys of `default`.
//! Both are adapted here into one [`PatchDef`] shape, so nothing past this
//! module branches on the encoding.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{BACKEND_VERSION, Error, PatchEncoding, PatchValue, Result, Target};


/// File name of a theme definition inside its directory.
pub const MANIFEST_FILE: &str = "theme.json";

/// Fragment files (relative to the theme directory) mapped to their targets.
pub type FragmentMap = IndexMap<String, Vec<Target>>;

/// Forced patch values per depended-upon theme.
pub type DependencyMap = IndexMap<String, IndexMap<String, PatchValue>>;

/// Canonical, validated theme definition.
#[derive(Debug, Clone)]
pub struct ThemeManifest {
	pub name: String,
	pub version: String,
	pub author: String,
	pub require: u32,
	pub inject: FragmentMap,
	pub patches: Vec<PatchDef>,
	pub dependencies: DependencyMap,
}

/// Canonical patch definition, independent of its on-disk encoding.
#[derive(Debug, Clone)]
pub struct PatchDef {
	pub name: String,
	pub default: String,
	pub kind: String,
	pub encoding: PatchEncoding,
	pub options: IndexMap<String, FragmentMap>,
	pub components: Vec<ComponentDef>,
}

/// Component declaration inside a patch.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentDef {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: String,
	pub on: String,
	pub default: String,
	pub css_variable: String,
	#[serde(default)]
	pub tabs: Vec<Target>,
}

#[derive(Deserialize)]
struct RawManifest {
	name: String,
	version: Option<String>,
	author: Option<String>,
	manifest_version: Option<u32>,
	#[serde(default)]
	inject: FragmentMap,
	#[serde(default)]
	patches: IndexMap<String, Map<String, Value>>,
	#[serde(default)]
	dependencies: DependencyMap,
}

impl ThemeManifest {
	/// Parses and validates a theme definition.
	pub fn parse(input: &str) -> Result<Self> {
		let raw: RawManifest = serde_json::from_str(input).map_err(|e| Error::Validation(format!("invalid theme definition: {e}")))?;
		Self::from_raw(raw)
	}

	/// Reads and parses `theme.json` from a theme directory.
	pub async fn load(theme_dir: &Path) -> Result<Self> {
		let path = theme_dir.join(MANIFEST_FILE);
		let input = tokio::fs::read_to_string(&path).await.map_err(|e| Error::io(&path, e))?;
		let raw: RawManifest = serde_json::from_str(&input).map_err(|e| Error::json(&path, e))?;
		Self::from_raw(raw)
	}

	fn from_raw(raw: RawManifest) -> Result<Self> {
		let require = raw.manifest_version.unwrap_or(1);
		if require > BACKEND_VERSION {
			return Err(Error::Validation(format!(
				"theme '{}' requires backend version {require}, this is version {BACKEND_VERSION}",
				raw.name
			)));
		}

		let patches = raw
			.patches
			.into_iter()
			.map(|(name, body)| parse_patch(name, body))
			.collect::<Result<Vec<_>>>()?;

		Ok(Self {
			name: raw.name,
			version: raw.version.unwrap_or_else(|| "v1.0".to_string()),
			author: raw.author.unwrap_or_default(),
			require,
			inject: raw.inject,
			patches,
			dependencies: raw.dependencies,
		})
	}
}

const RESERVED_PATCH_KEYS: &[&str] = &["default", "type", "components"];

fn parse_patch(name: String, mut body: Map<String, Value>) -> Result<PatchDef> {
	let default = match body.get("default") {
		Some(Value::String(default)) => default.clone(),
		_ => return Err(Error::Validation(format!("patch '{name}' has no default value"))),
	};
	let kind = match body.get("type") {
		Some(Value::String(kind)) => kind.clone(),
		_ => "dropdown".to_string(),
	};
	let components = match body.shift_remove("components") {
		Some(value) => serde_json::from_value::<Vec<ComponentDef>>(value)
			.map_err(|e| Error::Validation(format!("patch '{name}' has malformed components: {e}")))?,
		None => Vec::new(),
	};

	let (encoding, options) = match body.shift_remove("values") {
		Some(values) => (PatchEncoding::Current, current_options(&name, values)?),
		None => (PatchEncoding::Legacy, legacy_options(&name, body)?),
	};

	if !options.contains_key(&default) {
		return Err(Error::Validation(format!(
			"in patch '{name}', '{default}' does not exist as a patch option"
		)));
	}

	Ok(PatchDef {
		name,
		default,
		kind,
		encoding,
		options,
		components,
	})
}

/// `{"values": {"<option>": {"<file>": [targets]}}}`
fn current_options(name: &str, values: Value) -> Result<IndexMap<String, FragmentMap>> {
	serde_json::from_value(values).map_err(|e| Error::Validation(format!("patch '{name}' has malformed values: {e}")))
}

/// `{"default": "...", "<option>": {"<file>": [targets]}}`
fn legacy_options(name: &str, body: Map<String, Value>) -> Result<IndexMap<String, FragmentMap>> {
	body.into_iter()
		.filter(|(key, _)| !RESERVED_PATCH_KEYS.contains(&key.as_str()))
		.map(|(option, fragments)| {
			let fragments = serde_json::from_value(fragments)
				.map_err(|e| Error::Validation(format!("option '{option}' of patch '{name}' is malformed: {e}")))?;
			Ok((option, fragments))
		})
		.collect()
}
