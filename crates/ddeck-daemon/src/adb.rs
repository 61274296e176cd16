//! Connected device discovery through adb
//!
//! `adb devices -l` gives the live serials. Each online device is then asked
//! for its system properties, and emulators for the AVD they were launched
//! from, so the reconciler can link them back to their configuration.

use ddeck_core::prelude::*;
use ddeck_core::{AndroidDevice, ConnectedDevice};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::run_tool;
use crate::ToolAvailability;

/// Header line printed by `adb devices`
const DEVICES_HEADER: &str = "List of devices attached";

/// Connection state column of `adb devices`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdbState {
    Device,
    Offline,
    Unauthorized,
    Other(String),
}

impl AdbState {
    fn parse(state: &str) -> Self {
        match state {
            "device" => AdbState::Device,
            "offline" => AdbState::Offline,
            "unauthorized" => AdbState::Unauthorized,
            other => AdbState::Other(other.to_string()),
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, AdbState::Device)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AdbState::Device => "device",
            AdbState::Offline => "offline",
            AdbState::Unauthorized => "unauthorized",
            AdbState::Other(state) => state,
        }
    }
}

/// One row of `adb devices -l`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbDeviceEntry {
    pub serial: String,
    pub state: AdbState,
    /// `model:` qualifier, e.g. `Pixel_3`
    pub model: Option<String>,
    /// `product:` qualifier
    pub product: Option<String>,
}

/// Properties read from a device that name and link it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DeviceProperties {
    manufacturer: Option<String>,
    model: Option<String>,
    api_level: Option<u32>,
    avd_name: Option<String>,
}

/// Options for listing connected devices
#[derive(Debug, Clone, Copy)]
pub struct AdbOptions {
    /// Timeout for each adb invocation
    pub timeout: Duration,
    /// Also report devices that are offline or unauthorized
    pub include_offline: bool,
}

impl Default for AdbOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            include_offline: false,
        }
    }
}

/// Handle on the adb executable
#[derive(Debug, Clone)]
pub struct DeviceBridge {
    adb: PathBuf,
    options: AdbOptions,
}

impl DeviceBridge {
    pub fn new(adb: impl Into<PathBuf>, options: AdbOptions) -> Self {
        Self {
            adb: adb.into(),
            options,
        }
    }

    /// Build a bridge from detected tools
    pub fn from_tools(tools: &ToolAvailability, options: AdbOptions) -> Result<Self> {
        let adb = tools
            .adb_path
            .as_deref()
            .ok_or_else(|| Error::tool_not_found("adb"))?;
        Ok(Self::new(adb, options))
    }

    pub fn adb_path(&self) -> &Path {
        &self.adb
    }

    /// List connected devices
    ///
    /// Per-device queries run concurrently. A device whose queries fail is
    /// still reported, with whatever `adb devices -l` said about it.
    pub async fn connected_devices(&self) -> Result<Vec<ConnectedDevice>> {
        let stdout = self.run(&["devices", "-l"]).await?;
        let entries: Vec<AdbDeviceEntry> = parse_devices_list(&stdout)
            .into_iter()
            .filter(|entry| {
                let keep = self.options.include_offline || entry.state.is_online();
                if !keep {
                    debug!("Skipping {} ({})", entry.serial, entry.state.as_str());
                }
                keep
            })
            .collect();

        let devices = join_all(entries.into_iter().map(|entry| self.describe(entry))).await;

        debug!("Found {} connected device(s)", devices.len());

        Ok(devices)
    }

    async fn describe(&self, entry: AdbDeviceEntry) -> ConnectedDevice {
        if !entry.state.is_online() {
            return offline_device(entry);
        }

        let properties = match self.properties(&entry.serial).await {
            Ok(properties) => properties,
            Err(e) => {
                warn!("Failed to read properties of {}: {}", entry.serial, e);
                DeviceProperties::default()
            }
        };

        let mut handle =
            AndroidDevice::connected(&entry.serial).with_api_level(properties.api_level);

        if !handle.emulator {
            let name = physical_device_name(&properties, &entry);
            return ConnectedDevice::new(&entry.serial, &name, handle)
                .with_physical_device_name(name);
        }

        // Older system images do not expose the AVD name as a property
        let avd_name = match properties.avd_name {
            Some(name) => Some(name),
            None => self.emu_line(&entry.serial, "name").await,
        };
        if let Some(name) = &avd_name {
            handle = handle.with_avd_name(name);
        }

        let display = avd_name
            .as_deref()
            .map(|name| name.replace('_', " "))
            .unwrap_or_else(|| entry.serial.clone());
        let device = ConnectedDevice::new(&entry.serial, display, handle);

        match self.emu_line(&entry.serial, "path").await {
            Some(path) => match avd_key_from_path(&path) {
                Some(key) => device.with_virtual_device_key(key),
                None => device,
            },
            None => device,
        }
    }

    async fn properties(&self, serial: &str) -> Result<DeviceProperties> {
        let stdout = self.run(&["-s", serial, "shell", "getprop"]).await?;
        let props = parse_getprop(&stdout);

        let take = |key: &str| props.get(key).filter(|v| !v.is_empty()).cloned();

        Ok(DeviceProperties {
            manufacturer: take("ro.product.manufacturer"),
            model: take("ro.product.model"),
            api_level: take("ro.build.version.sdk").and_then(|sdk| sdk.parse().ok()),
            avd_name: take("ro.boot.qemu.avd_name").or_else(|| take("ro.kernel.qemu.avd_name")),
        })
    }

    /// First line of `adb -s <serial> emu avd <query>`
    async fn emu_line(&self, serial: &str, query: &str) -> Option<String> {
        match self.run(&["-s", serial, "emu", "avd", query]).await {
            Ok(stdout) => parse_emu_reply(&stdout),
            Err(e) => {
                debug!("emu avd {} failed for {}: {}", query, serial, e);
                None
            }
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        run_tool(&self.adb, args, self.options.timeout).await
    }
}

/// Parse the output of `adb devices -l`
///
/// ```text
/// List of devices attached
/// 86UX00F4R              device usb:1-1 product:blueline model:Pixel_3 device:blueline transport_id:2
/// emulator-5554          device product:sdk_gphone_x86 model:Android_SDK_built_for_x86 transport_id:1
/// ```
pub fn parse_devices_list(output: &str) -> Vec<AdbDeviceEntry> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('*') && *line != DEVICES_HEADER)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let serial = columns.next()?;
            let state = columns.next()?;

            let qualifiers: HashMap<&str, &str> = columns
                .filter_map(|column| column.split_once(':'))
                .collect();

            Some(AdbDeviceEntry {
                serial: serial.to_string(),
                state: AdbState::parse(state),
                model: qualifiers.get("model").map(|m| m.to_string()),
                product: qualifiers.get("product").map(|p| p.to_string()),
            })
        })
        .collect()
}

/// Parse `getprop` output lines of the form `[key]: [value]`
fn parse_getprop(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once("]: [")?;
            let key = key.strip_prefix('[')?;
            let value = value.strip_suffix(']')?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Console replies end with an `OK` line; the answer is the line before it
fn parse_emu_reply(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && *line != "OK" && !line.starts_with("KO"))
        .map(str::to_string)
}

/// `/home/me/.android/avd/Pixel_3_API_Q.avd` -> `Pixel_3_API_Q`
fn avd_key_from_path(path: &str) -> Option<String> {
    let file_name = Path::new(path.trim_end_matches(['/', '\\'])).file_name()?;
    let file_name = file_name.to_string_lossy();
    let key = file_name.strip_suffix(".avd").unwrap_or(&file_name);
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Marketing name such as "Google Pixel 3"
fn physical_device_name(properties: &DeviceProperties, entry: &AdbDeviceEntry) -> String {
    let model = properties
        .model
        .clone()
        .or_else(|| entry.model.as_ref().map(|m| m.replace('_', " ")));

    match (properties.manufacturer.as_deref(), model) {
        (Some(manufacturer), Some(model))
            if model
                .to_lowercase()
                .starts_with(&manufacturer.to_lowercase()) =>
        {
            model
        }
        (Some(manufacturer), Some(model)) => format!("{} {}", capitalize(manufacturer), model),
        (None, Some(model)) => model,
        (_, None) => entry.serial.clone(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn offline_device(entry: AdbDeviceEntry) -> ConnectedDevice {
    let mut handle = AndroidDevice::connected(&entry.serial);
    handle.running = false;
    let name = format!("{} ({})", entry.serial, entry.state.as_str());
    ConnectedDevice::new(&entry.serial, &name, handle).with_physical_device_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(serial: &str, model: Option<&str>) -> AdbDeviceEntry {
        AdbDeviceEntry {
            serial: serial.to_string(),
            state: AdbState::Device,
            model: model.map(str::to_string),
            product: None,
        }
    }

    #[test]
    fn test_parse_devices_list() {
        let output = "\
List of devices attached
86UX00F4R              device usb:1-1 product:blueline model:Pixel_3 device:blueline transport_id:2
emulator-5554          device product:sdk_gphone_x86 model:Android_SDK_built_for_x86 device:generic_x86 transport_id:1

";
        let entries = parse_devices_list(output);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].serial, "86UX00F4R");
        assert_eq!(entries[0].state, AdbState::Device);
        assert_eq!(entries[0].model.as_deref(), Some("Pixel_3"));
        assert_eq!(entries[0].product.as_deref(), Some("blueline"));
        assert_eq!(entries[1].serial, "emulator-5554");
    }

    #[test]
    fn test_parse_devices_list_daemon_banner_and_states() {
        let output = "\
* daemon not running; starting now at tcp:5037
* daemon started successfully
List of devices attached
R58M123ABC	unauthorized usb:1-2 transport_id:3
emulator-5556	offline transport_id:4
0123456789	recovery
";
        let entries = parse_devices_list(output);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].state, AdbState::Unauthorized);
        assert_eq!(entries[1].state, AdbState::Offline);
        assert_eq!(entries[2].state, AdbState::Other("recovery".to_string()));
        assert!(!entries[2].state.is_online());
    }

    #[test]
    fn test_parse_devices_list_empty() {
        assert!(parse_devices_list("List of devices attached\n\n").is_empty());
    }

    #[test]
    fn test_parse_getprop() {
        let output = "\
[ro.boot.qemu.avd_name]: [Pixel_3_API_Q]
[ro.build.version.sdk]: [29]
[ro.product.manufacturer]: [Google]
[persist.sys.empty]: []
garbage line
";
        let props = parse_getprop(output);

        assert_eq!(props.get("ro.boot.qemu.avd_name").unwrap(), "Pixel_3_API_Q");
        assert_eq!(props.get("ro.build.version.sdk").unwrap(), "29");
        assert_eq!(props.get("persist.sys.empty").unwrap(), "");
        assert_eq!(props.len(), 4);
    }

    #[test]
    fn test_parse_emu_reply() {
        assert_eq!(
            parse_emu_reply("Pixel_3_API_Q\r\nOK\r\n").as_deref(),
            Some("Pixel_3_API_Q")
        );
        assert_eq!(parse_emu_reply("OK\n"), None);
        assert_eq!(parse_emu_reply("KO: unknown command\n"), None);
    }

    #[test]
    fn test_avd_key_from_path() {
        assert_eq!(
            avd_key_from_path("/home/me/.android/avd/Pixel_3_API_Q.avd").as_deref(),
            Some("Pixel_3_API_Q")
        );
        assert_eq!(
            avd_key_from_path("/home/me/.android/avd/Pixel_3_API_Q.avd/").as_deref(),
            Some("Pixel_3_API_Q")
        );
        assert_eq!(avd_key_from_path(""), None);
    }

    #[test]
    fn test_physical_device_name_prefixes_manufacturer() {
        let properties = DeviceProperties {
            manufacturer: Some("Google".to_string()),
            model: Some("Pixel 3".to_string()),
            ..Default::default()
        };
        assert_eq!(
            physical_device_name(&properties, &entry("86UX00F4R", None)),
            "Google Pixel 3"
        );
    }

    #[test]
    fn test_physical_device_name_avoids_duplicate_manufacturer() {
        let properties = DeviceProperties {
            manufacturer: Some("samsung".to_string()),
            model: Some("Samsung Galaxy S10".to_string()),
            ..Default::default()
        };
        assert_eq!(
            physical_device_name(&properties, &entry("R58M123ABC", None)),
            "Samsung Galaxy S10"
        );

        let properties = DeviceProperties {
            manufacturer: Some("samsung".to_string()),
            model: Some("SM-G973F".to_string()),
            ..Default::default()
        };
        assert_eq!(
            physical_device_name(&properties, &entry("R58M123ABC", None)),
            "Samsung SM-G973F"
        );
    }

    #[test]
    fn test_physical_device_name_falls_back_to_listing() {
        let properties = DeviceProperties::default();
        assert_eq!(
            physical_device_name(&properties, &entry("86UX00F4R", Some("Pixel_3"))),
            "Pixel 3"
        );
        assert_eq!(
            physical_device_name(&properties, &entry("86UX00F4R", None)),
            "86UX00F4R"
        );
    }

    #[test]
    fn test_offline_device_is_not_running() {
        let device = offline_device(AdbDeviceEntry {
            serial: "emulator-5556".to_string(),
            state: AdbState::Offline,
            model: None,
            product: None,
        });

        assert!(!device.android_device().running);
        assert_eq!(device.physical_device_name(), Some("emulator-5556 (offline)"));
        assert_eq!(device.virtual_device_key(), None);
    }

    #[test]
    fn test_bridge_requires_adb() {
        let result = DeviceBridge::from_tools(&ToolAvailability::default(), AdbOptions::default());
        assert!(matches!(result, Err(Error::ToolNotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_adb_binary_fails_listing() {
        let bridge = DeviceBridge::new("/definitely/not/here/adb", AdbOptions::default());
        let result = bridge.connected_devices().await;
        assert!(matches!(result, Err(Error::ToolNotFound { .. })));
    }
}
