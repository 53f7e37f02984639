//! Serializable snapshots handed to the presentation layer.

use serde::Serialize;

use crate::{ComponentKind, PatchKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeRecord {
	pub name: String,
	pub version: String,
	pub author: String,
	pub enabled: bool,
	pub bundled: bool,
	pub require: u32,
	pub dependencies: Vec<String>,
	pub patches: Vec<PatchRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchRecord {
	pub name: String,
	pub default: String,
	pub value: String,
	pub options: Vec<String>,
	#[serde(rename = "type")]
	pub kind: PatchKind,
	pub components: Vec<ComponentRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRecord {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: ComponentKind,
	pub on: String,
	pub value: String,
}
