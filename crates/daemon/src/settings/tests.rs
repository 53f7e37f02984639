use pretty_assertions::assert_eq;

use super::*;

#[test]
fn empty_file_means_defaults() {
	let settings = Settings::parse("", Path::new("config.toml")).unwrap();
	assert_eq!(settings, Settings::default());
	assert_eq!(settings.catalog.url, DEFAULT_CATALOG_URL);
	assert_eq!(settings.primary_target(), Target::from("SP"));
	assert!(settings.themes_dir.ends_with("homebrew/themes"));
}

#[test]
fn sections_override_only_what_they_name() {
	let input = r#"
		themes_dir = "/srv/themes"
		config_scope = "privileged"

		[reconcile]
		interval_ms = 500

		[startup]
		primary_target = "QuickAccess"
	"#;
	let settings = Settings::parse(input, Path::new("config.toml")).unwrap();

	assert_eq!(settings.themes_dir, PathBuf::from("/srv/themes"));
	assert_eq!(settings.config_scope.resolve(), ConfigScope::Privileged);
	assert_eq!(settings.startup.marker_attempts, 9999);
	assert_eq!(
		settings.reconcile_config(),
		ReconcileConfig {
			interval: Duration::from_millis(500),
			marker: RetryPolicy::new(3, Duration::from_secs(1)),
		}
	);
	assert_eq!(settings.primary_target(), Target::from("QuickAccess"));
}

#[test]
fn unknown_keys_are_rejected() {
	let err = Settings::parse("[reconcile]\nintervall_ms = 1\n", Path::new("lacquer.toml")).unwrap_err();
	assert!(matches!(err, SettingsError::Parse { .. }));
	assert!(err.to_string().starts_with("invalid settings in lacquer.toml"));
}

#[test]
fn explicit_file_must_exist() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("missing.toml");
	assert!(matches!(Settings::load(Some(&path)), Err(SettingsError::Io { .. })));

	std::fs::write(&path, "bundled_dir = \"/opt/themes\"\n").unwrap();
	let settings = Settings::load(Some(&path)).unwrap();
	assert_eq!(settings.locations().bundled, Some(PathBuf::from("/opt/themes")));
}

#[test]
fn zero_reconcile_interval_is_rejected() {
	let err = Settings::parse("[reconcile]\ninterval_ms = 0\n", Path::new("lacquer.toml")).unwrap_err();
	assert!(matches!(err, SettingsError::Invalid { .. }));
	assert_eq!(
		err.to_string(),
		"invalid settings in lacquer.toml: reconcile.interval_ms must be greater than zero"
	);
}
