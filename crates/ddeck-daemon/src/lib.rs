//! # ddeck-daemon - Android Device Sources
//!
//! Talks to the Android SDK tools that know about devices: `emulator` for the
//! configured AVDs and `adb` for everything currently connected.
//!
//! Depends on [`ddeck_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### AVD Discovery
//! - [`list_android_avds()`] - Configured AVDs as disconnected virtual devices
//! - [`AndroidAvd`] - A parsed AVD entry
//!
//! ### Connected Devices
//! - [`DeviceBridge`] - `adb` wrapper listing connected devices
//! - [`AdbOptions`] - Timeout and offline-device handling
//! - [`parse_devices_list()`] - Parse `adb devices -l`
//!
//! ### Platform Utilities
//! - [`ToolAvailability`] - Locate `adb` and `emulator`
//! - [`run_tool()`] - Run an SDK tool with a timeout

pub mod adb;
pub mod avds;
pub mod command;
pub mod tool_availability;

// Public API re-exports
pub use adb::{parse_devices_list, AdbDeviceEntry, AdbOptions, AdbState, DeviceBridge};
pub use avds::{list_android_avds, AndroidAvd};
pub use command::run_tool;
pub use tool_availability::ToolAvailability;
