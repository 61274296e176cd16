//! Settings parser for .ddeck/config.toml

use super::types::Settings;
use ddeck_core::prelude::*;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "config.toml";
pub const DDECK_DIR: &str = ".ddeck";

const DEFAULT_CONFIG: &str = r#"# deploy-deck configuration

[devices]
poll_interval_ms = 2000       # How often `ddeck watch` refreshes
discovery_timeout_ms = 10000  # Timeout for each adb/emulator call
include_offline = false       # Also list offline/unauthorized adb devices
adb_path = ""                 # Empty = auto-detect (PATH, ANDROID_HOME, ANDROID_SDK_ROOT)
emulator_path = ""            # Empty = auto-detect

[checker]
min_api_level = 0             # Flag devices below this API level (0 = off)
"#;

/// Path of the settings file for a project
pub fn config_path(project_path: &Path) -> PathBuf {
    project_path.join(DDECK_DIR).join(CONFIG_FILENAME)
}

/// Load settings from .ddeck/config.toml
///
/// Returns default settings if file doesn't exist or can't be parsed.
pub fn load_settings(project_path: &Path) -> Settings {
    let config_path = config_path(project_path);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create default config file in .ddeck/ directory
///
/// An existing file is left alone. Returns the config file path.
pub fn init_config_dir(project_path: &Path) -> Result<PathBuf> {
    let ddeck_dir = project_path.join(DDECK_DIR);

    if !ddeck_dir.exists() {
        std::fs::create_dir_all(&ddeck_dir)
            .map_err(|e| Error::config(format!("Failed to create .ddeck dir: {}", e)))?;
    }

    let config_path = ddeck_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        std::fs::write(&config_path, DEFAULT_CONFIG)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Created {:?}", config_path);
    }

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_defaults() {
        let temp = tempdir().unwrap();
        let settings = load_settings(temp.path());

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        let ddeck_dir = temp.path().join(".ddeck");
        std::fs::create_dir_all(&ddeck_dir).unwrap();

        let config = r#"
[devices]
poll_interval_ms = 500
adb_path = "/opt/android/platform-tools/adb"

[checker]
min_api_level = 26
"#;
        std::fs::write(ddeck_dir.join("config.toml"), config).unwrap();

        let settings = load_settings(temp.path());

        assert_eq!(settings.devices.poll_interval_ms, 500);
        assert_eq!(settings.devices.discovery_timeout_ms, 10_000);
        assert_eq!(
            settings.devices.adb_override(),
            Some(PathBuf::from("/opt/android/platform-tools/adb"))
        );
        assert_eq!(settings.checker.min_api_level, 26);
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = tempdir().unwrap();
        let ddeck_dir = temp.path().join(".ddeck");
        std::fs::create_dir_all(&ddeck_dir).unwrap();

        std::fs::write(ddeck_dir.join("config.toml"), "not valid toml {{{{").unwrap();

        // Should return defaults
        let settings = load_settings(temp.path());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_init_config_dir() {
        let temp = tempdir().unwrap();

        let path = init_config_dir(temp.path()).unwrap();

        assert_eq!(path, temp.path().join(".ddeck/config.toml"));
        assert!(path.exists());

        // Default file parses to default settings
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Settings = toml::from_str(&content).expect("Default config should be valid TOML");
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn test_init_config_dir_idempotent() {
        let temp = tempdir().unwrap();

        init_config_dir(temp.path()).unwrap();

        let config_path = temp.path().join(".ddeck/config.toml");
        std::fs::write(&config_path, "[checker]\nmin_api_level = 30\n").unwrap();

        // Second init should not overwrite
        init_config_dir(temp.path()).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("min_api_level = 30"));
    }
}
