//! Where configured and connected devices come from
//!
//! [`DeviceSource`] is the seam between the getter and the Android tools.
//! [`SdkDeviceSource`] is the real implementation; tests substitute fakes.

use ddeck_core::prelude::*;
use ddeck_core::{ConnectedDevice, VirtualDevice};
use ddeck_daemon::{list_android_avds, AdbOptions, DeviceBridge, ToolAvailability};
use std::time::Duration;

use crate::config::DeviceSettings;

/// Supplies snapshots of virtual and connected devices
#[trait_variant::make(DeviceSource: Send)]
pub trait LocalDeviceSource {
    /// Configured virtual devices, all disconnected, in display order
    async fn virtual_devices(&self) -> Result<Vec<VirtualDevice>>;

    /// Devices currently reachable through the device bridge
    async fn connected_devices(&self) -> Result<Vec<ConnectedDevice>>;
}

/// Device source backed by the Android SDK `emulator` and `adb` tools
///
/// A missing tool yields an empty list rather than an error.
#[derive(Debug, Clone)]
pub struct SdkDeviceSource {
    tools: ToolAvailability,
    bridge: Option<DeviceBridge>,
    timeout: Duration,
}

impl SdkDeviceSource {
    pub fn new(tools: ToolAvailability, settings: &DeviceSettings) -> Self {
        let options = AdbOptions {
            timeout: settings.discovery_timeout(),
            include_offline: settings.include_offline,
        };
        let bridge = match DeviceBridge::from_tools(&tools, options) {
            Ok(bridge) => {
                debug!("Using adb at {}", bridge.adb_path().display());
                Some(bridge)
            }
            Err(e) => {
                debug!("No device bridge: {}", e);
                None
            }
        };

        Self {
            tools,
            bridge,
            timeout: settings.discovery_timeout(),
        }
    }

    /// Detect tools from settings and build a source
    pub fn detect(settings: &DeviceSettings) -> Self {
        let tools = ToolAvailability::check(
            settings.adb_override().as_deref(),
            settings.emulator_override().as_deref(),
        );
        Self::new(tools, settings)
    }

    pub fn tools(&self) -> &ToolAvailability {
        &self.tools
    }

    /// The adb bridge, absent when adb was not found
    pub fn bridge(&self) -> Option<&DeviceBridge> {
        self.bridge.as_ref()
    }
}

impl DeviceSource for SdkDeviceSource {
    async fn virtual_devices(&self) -> Result<Vec<VirtualDevice>> {
        if !self.tools.has_emulator() {
            trace!("No emulator tool, skipping AVD listing");
            return Ok(Vec::new());
        }
        list_android_avds(&self.tools, self.timeout).await
    }

    async fn connected_devices(&self) -> Result<Vec<ConnectedDevice>> {
        match &self.bridge {
            Some(bridge) => bridge.connected_devices().await,
            None => {
                trace!("No adb tool, skipping connected devices");
                Ok(Vec::new())
            }
        }
    }
}
