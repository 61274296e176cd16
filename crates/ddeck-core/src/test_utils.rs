//! Test utilities for device fixtures
//!
//! Provides helper functions for creating test devices in other crates.

use crate::types::{AndroidDevice, ConnectedDevice, VirtualDevice};

/// Creates an offline AVD with a display name derived from its key.
pub fn test_avd(key: &str) -> VirtualDevice {
    VirtualDevice::new(key, key.replace('_', " "), AndroidDevice::launchable(key))
}

/// Creates a running emulator explicitly linked to the AVD `avd_key`.
///
/// # Arguments
/// * `serial` - adb serial, e.g. `emulator-5554`
/// * `avd_key` - key of the AVD the emulator was launched from
pub fn test_emulator(serial: &str, avd_key: &str) -> ConnectedDevice {
    ConnectedDevice::new(
        serial,
        avd_key.replace('_', " "),
        AndroidDevice::connected(serial).with_avd_name(avd_key),
    )
    .with_virtual_device_key(avd_key)
}

/// Creates a physical device.
///
/// # Arguments
/// * `serial` - hardware serial number
/// * `name` - marketing name, e.g. "Google Pixel 3"
pub fn test_physical(serial: &str, name: &str) -> ConnectedDevice {
    ConnectedDevice::new(serial, name, AndroidDevice::connected(serial))
        .with_physical_device_name(name)
}
