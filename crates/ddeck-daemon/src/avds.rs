//! Android AVD (Android Virtual Device) discovery
//!
//! Lists configured AVDs with `emulator -list-avds` and enriches each one from
//! its `config.ini` when the AVD home directory is readable.

use ddeck_core::prelude::*;
use ddeck_core::{AndroidDevice, VirtualDevice};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use crate::command::run_tool;
use crate::ToolAvailability;

/// Static regex pattern for extracting API level from AVD names
static API_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_API_(\d+)$").expect("Invalid API pattern regex"));

/// Static regex pattern for the API level inside a system image path or target
static TARGET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"android-(\d+)").expect("Invalid target pattern regex"));

/// An Android Virtual Device (AVD)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidAvd {
    /// AVD name (used as the device key)
    pub name: String,
    /// Friendly display name
    pub display_name: String,
    /// API level (e.g., 33 for Android 13)
    pub api_level: Option<u32>,
}

impl AndroidAvd {
    pub fn into_virtual_device(self) -> VirtualDevice {
        let handle = AndroidDevice::launchable(&self.name).with_api_level(self.api_level);
        VirtualDevice::new(self.name, self.display_name, handle)
    }
}

/// Settings read from `<avd home>/<name>.avd/config.ini`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AvdConfig {
    display_name: Option<String>,
    api_level: Option<u32>,
}

/// List all configured Android AVDs as disconnected virtual devices
///
/// Uses the emulator path from ToolAvailability.
pub async fn list_android_avds(
    tool_availability: &ToolAvailability,
    limit: Duration,
) -> Result<Vec<VirtualDevice>> {
    let emulator = tool_availability
        .emulator_path
        .as_deref()
        .ok_or_else(|| Error::tool_not_found("emulator"))?;

    let stdout = run_tool(emulator, &["-list-avds"], limit).await?;
    let mut avds = parse_avd_list(&stdout);

    if let Some(home) = avd_home() {
        for avd in &mut avds {
            apply_config(avd, &home).await;
        }
    }

    debug!("Found {} AVD(s)", avds.len());

    Ok(avds
        .into_iter()
        .map(AndroidAvd::into_virtual_device)
        .collect())
}

/// Parse the output of `emulator -list-avds`
///
/// Output format is one AVD name per line. Diagnostic lines the emulator
/// sometimes prints (`INFO    | ...`) are skipped; AVD names never contain
/// whitespace.
fn parse_avd_list(output: &str) -> Vec<AndroidAvd> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains(char::is_whitespace))
        .map(|name| {
            let (display_name, api_level) = parse_avd_name(name);

            AndroidAvd {
                name: name.to_string(),
                display_name,
                api_level,
            }
        })
        .collect()
}

/// Parse AVD name to extract display name and API level
///
/// Common naming patterns:
/// - "Pixel_6_API_33" -> ("Pixel 6 API 33", Some(33))
/// - "Pixel_3_API_Q" -> ("Pixel 3 API Q", None)
/// - "My_Custom_AVD" -> ("My Custom AVD", None)
fn parse_avd_name(name: &str) -> (String, Option<u32>) {
    let api_level = API_PATTERN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok());

    (name.replace('_', " "), api_level)
}

/// Overlay `config.ini` values onto a listed AVD
async fn apply_config(avd: &mut AndroidAvd, home: &Path) {
    let path = home.join(format!("{}.avd", avd.name)).join("config.ini");

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) => {
            trace!("No readable config for {}: {}", avd.name, e);
            return;
        }
    };

    let config = parse_config_ini(&content);
    if let Some(display_name) = config.display_name {
        avd.display_name = display_name;
    }
    if config.api_level.is_some() {
        avd.api_level = config.api_level;
    }
}

/// Parse the `key=value` lines of an AVD `config.ini`
fn parse_config_ini(content: &str) -> AvdConfig {
    let values: HashMap<&str, &str> = content
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect();

    let display_name = values
        .get("avd.ini.displayname")
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string());

    let api_level = ["image.sysdir.1", "target"]
        .iter()
        .filter_map(|key| values.get(key))
        .find_map(|value| {
            TARGET_PATTERN
                .captures(value)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
        });

    AvdConfig {
        display_name,
        api_level,
    }
}

/// Directory holding `<name>.avd` folders
///
/// `ANDROID_AVD_HOME` wins, then `ANDROID_USER_HOME/avd`, then `~/.android/avd`.
fn avd_home() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("ANDROID_AVD_HOME") {
        return Some(PathBuf::from(home));
    }
    if let Some(user_home) = std::env::var_os("ANDROID_USER_HOME") {
        return Some(PathBuf::from(user_home).join("avd"));
    }
    dirs::home_dir().map(|home| home.join(".android").join("avd"))
}
