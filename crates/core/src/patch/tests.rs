use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;
use crate::manifest::ThemeManifest;
use crate::{MemoryHost, Target};

fn sp() -> Target {
	Target::from("SP")
}

fn color_patch() -> (TempDir, Patch) {
	let dir = tempfile::tempdir().unwrap();
	std::fs::write(dir.path().join("red.css"), ".red {}").unwrap();
	std::fs::write(dir.path().join("blue.css"), ".blue {}").unwrap();
	let manifest = ThemeManifest::parse(
		r##"{
			"name": "A",
			"patches": {
				"Color": {
					"default": "Red",
					"values": {
						"Red": {"red.css": ["SP"]},
						"Blue": {"blue.css": ["SP"]},
						"Custom": {}
					},
					"components": [{
						"name": "Accent",
						"type": "color-picker",
						"on": "Custom",
						"default": "#ff00ff",
						"css_variable": "accent",
						"tabs": ["SP"]
					}]
				}
			}
		}"##,
	)
	.unwrap();
	let def = manifest.patches.into_iter().next().unwrap();
	let patch = Patch::from_def("A", dir.path(), def).unwrap();
	(dir, patch)
}

#[test]
fn checkbox_needs_exactly_no_and_yes() {
	assert_eq!(PatchKind::resolve("checkbox", ["Yes", "No"]), PatchKind::Checkbox);
	assert_eq!(PatchKind::resolve("checkbox", ["Yes", "No", "Maybe"]), PatchKind::Dropdown);
	assert_eq!(PatchKind::resolve("checkbox", ["On", "Off"]), PatchKind::Dropdown);
	assert_eq!(PatchKind::resolve("slider", ["1", "2"]), PatchKind::Slider);
	assert_eq!(PatchKind::resolve("wheel", ["1", "2"]), PatchKind::Dropdown);
}

#[test]
fn derived_component_unit_is_generated_at_load() {
	let (_dir, patch) = color_patch();
	let custom: Vec<_> = patch.option_units("Custom").collect();
	assert_eq!(custom.len(), 1);
	assert!(custom[0].is_derived());
	assert_eq!(custom[0].fragment(), Some(":root { --accent: #ff00ff; }"));
}

#[tokio::test]
async fn apply_activates_only_selected_option() {
	let (_dir, mut patch) = color_patch();
	let host = MemoryHost::new();
	assert!(patch.select("Blue"));

	patch.apply(&host).await.unwrap();

	assert_eq!(host.fragments(&sp()), vec![".blue {}".to_string()]);
	assert!(patch.option_units("Blue").all(Unit::is_enabled));
	assert!(!patch.option_units("Red").any(Unit::is_enabled));
}

#[tokio::test]
async fn remove_clears_every_option() {
	let (_dir, mut patch) = color_patch();
	let host = MemoryHost::new();
	patch.apply(&host).await.unwrap();
	patch.select("Custom");
	patch.apply(&host).await.unwrap();
	assert_eq!(host.fragment_count(&sp()), 2);

	patch.remove(&host).await.unwrap();

	assert_eq!(host.fragment_count(&sp()), 0);
	assert!(patch.units().iter().all(|u| u.handle_count() == 0));
}

#[test]
fn unknown_selection_falls_back_to_default() {
	let (_dir, mut patch) = color_patch();
	patch.set_value(&PatchValue::from("Green")).unwrap();
	assert_eq!(patch.value(), "Red");
}

#[test]
fn structured_value_round_trips() {
	let (_dir, mut patch) = color_patch();
	let value = PatchValue::WithComponents {
		value: Some("Custom".into()),
		components: [("Accent".to_string(), "#00ff00".to_string())].into_iter().collect(),
	};

	patch.set_value(&value).unwrap();

	assert_eq!(patch.get_value(), value);
	assert_eq!(
		patch.option_units("Custom").next().and_then(Unit::fragment),
		Some(":root { --accent: #00ff00; }")
	);
}

#[test]
fn bare_value_round_trips_without_components() {
	let dir = tempfile::tempdir().unwrap();
	let manifest = ThemeManifest::parse(r#"{"name": "A", "patches": {"Size": {"default": "S", "S": {}, "L": {}}}}"#).unwrap();
	let mut patch = Patch::from_def("A", dir.path(), manifest.patches.into_iter().next().unwrap()).unwrap();

	patch.set_value(&PatchValue::from("L")).unwrap();

	assert_eq!(patch.get_value(), PatchValue::from("L"));
}

#[test]
fn terminator_in_component_value_is_rejected() {
	let (_dir, mut patch) = color_patch();
	let value = PatchValue::WithComponents {
		value: Some("Blue".into()),
		components: [("Accent".to_string(), "red; } body { display: none".to_string())].into_iter().collect(),
	};

	assert!(matches!(patch.set_value(&value), Err(Error::Validation(_))));
	assert!(matches!(patch.set_component("Accent", "a;b"), Err(Error::Validation(_))));

	assert_eq!(patch.value(), "Red");
	assert_eq!(patch.component("Accent").map(Component::value), Some("#ff00ff"));
	assert_eq!(
		patch.option_units("Custom").next().and_then(Unit::fragment),
		Some(":root { --accent: #ff00ff; }")
	);
}

#[test]
fn unknown_components_are_ignored() {
	let (_dir, mut patch) = color_patch();
	let value = PatchValue::WithComponents {
		value: None,
		components: [("Glow".to_string(), "1px".to_string())].into_iter().collect(),
	};
	patch.set_value(&value).unwrap();
	assert_eq!(patch.component("Accent").map(Component::value), Some("#ff00ff"));
}

#[tokio::test]
async fn component_edit_reapplies_only_live_units() {
	let (_dir, mut patch) = color_patch();
	let host = MemoryHost::new();

	patch.set_component_and_reapply(&host, "Accent", "#111111").await.unwrap();
	assert_eq!(host.injected(), 0);

	patch.select("Custom");
	patch.apply(&host).await.unwrap();
	patch.set_component_and_reapply(&host, "Accent", "#222222").await.unwrap();

	assert_eq!(host.fragments(&sp()), vec![":root { --accent: #222222; }".to_string()]);
}

#[tokio::test]
async fn missing_component_is_a_lookup_failure() {
	let (_dir, mut patch) = color_patch();
	let err = patch.set_component_and_reapply(&MemoryHost::new(), "Glow", "1px").await.unwrap_err();
	assert_eq!(err.to_string(), "Failed to find component 'Glow'");
}

#[test]
fn component_on_missing_option_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let manifest = ThemeManifest::parse(
		r##"{"name": "A", "patches": {"P": {"default": "X", "values": {"X": {}}, "components": [
			{"name": "C", "type": "color-picker", "on": "Y", "default": "#fff", "css_variable": "c", "tabs": ["SP"]}
		]}}}"##,
	)
	.unwrap();
	let err = Patch::from_def("A", dir.path(), manifest.patches.into_iter().next().unwrap()).unwrap_err();
	assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn unknown_component_type_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let manifest = ThemeManifest::parse(
		r##"{"name": "A", "patches": {"P": {"default": "X", "values": {"X": {}}, "components": [
			{"name": "C", "type": "slider", "on": "X", "default": "1", "css_variable": "c", "tabs": ["SP"]}
		]}}}"##,
	)
	.unwrap();
	assert!(Patch::from_def("A", dir.path(), manifest.patches.into_iter().next().unwrap()).is_err());
}

#[test]
fn terminator_in_css_variable_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let manifest = ThemeManifest::parse(
		r##"{"name": "A", "patches": {"P": {"default": "X", "values": {"X": {}}, "components": [
			{"name": "C", "type": "color-picker", "on": "X", "default": "#fff", "css_variable": "c; color: red", "tabs": ["SP"]}
		]}}}"##,
	)
	.unwrap();

	let err = Patch::from_def("A", dir.path(), manifest.patches.into_iter().next().unwrap()).unwrap_err();

	assert!(matches!(err, Error::Validation(ref message) if message.contains("css variable")));
}
