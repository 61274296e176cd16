//! Configuration types for deploy-deck
//!
//! Defines:
//! - `Settings` - Root of `.ddeck/config.toml`
//! - `DeviceSettings` - Polling and tool locations
//! - `CheckerSettings` - Launch compatibility rules

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global application settings
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub devices: DeviceSettings,

    #[serde(default)]
    pub checker: CheckerSettings,
}

/// How devices are discovered
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeviceSettings {
    /// Period of the watch loop in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Timeout for each adb/emulator invocation in milliseconds
    #[serde(default = "default_discovery_timeout_ms")]
    pub discovery_timeout_ms: u64,

    /// List adb devices that are offline or unauthorized
    #[serde(default)]
    pub include_offline: bool,

    /// Explicit adb executable (empty = auto-detect)
    #[serde(default)]
    pub adb_path: String,

    /// Explicit emulator executable (empty = auto-detect)
    #[serde(default)]
    pub emulator_path: String,
}

/// Floor for configured durations
const MIN_DURATION_MS: u64 = 100;

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_discovery_timeout_ms() -> u64 {
    10_000
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            discovery_timeout_ms: default_discovery_timeout_ms(),
            include_offline: false,
            adb_path: String::new(),
            emulator_path: String::new(),
        }
    }
}

impl DeviceSettings {
    /// Poll interval, never shorter than 100ms
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_DURATION_MS))
    }

    /// Per-invocation tool timeout, never shorter than 100ms
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms.max(MIN_DURATION_MS))
    }

    pub fn adb_override(&self) -> Option<PathBuf> {
        non_empty_path(&self.adb_path)
    }

    pub fn emulator_override(&self) -> Option<PathBuf> {
        non_empty_path(&self.emulator_path)
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

/// Launch compatibility rules
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CheckerSettings {
    /// Minimum API level the app supports (0 = no checking)
    #[serde(default)]
    pub min_api_level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.devices.poll_interval_ms, 2000);
        assert_eq!(settings.devices.discovery_timeout_ms, 10_000);
        assert!(!settings.devices.include_offline);
        assert_eq!(settings.checker.min_api_level, 0);
    }

    #[test]
    fn test_deserialize_partial_section() {
        let settings: Settings = toml::from_str("[devices]\ninclude_offline = true\n").unwrap();
        assert!(settings.devices.include_offline);
        assert_eq!(settings.devices.poll_interval_ms, 2000);
    }

    #[test]
    fn test_poll_interval_has_floor() {
        let settings = DeviceSettings {
            poll_interval_ms: 5,
            ..Default::default()
        };
        assert_eq!(settings.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_discovery_timeout_has_floor() {
        let settings = DeviceSettings {
            discovery_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(settings.discovery_timeout(), Duration::from_millis(100));

        let settings = DeviceSettings {
            discovery_timeout_ms: 2500,
            ..Default::default()
        };
        assert_eq!(settings.discovery_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_empty_paths_mean_autodetect() {
        let mut settings = DeviceSettings::default();
        assert_eq!(settings.adb_override(), None);

        settings.adb_path = "  ".to_string();
        assert_eq!(settings.adb_override(), None);

        settings.emulator_path = "/opt/sdk/emulator/emulator".to_string();
        assert_eq!(
            settings.emulator_override(),
            Some(PathBuf::from("/opt/sdk/emulator/emulator"))
        );
    }
}
