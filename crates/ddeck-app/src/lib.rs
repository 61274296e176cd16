//! # ddeck-app - Application Layer
//!
//! Wires the device sources from [`ddeck_daemon`] to the reconciler in
//! [`ddeck_core`], adds configuration and keeps a device list up to date.
//!
//! ## Public API
//!
//! ### Configuration (`config`)
//! - [`Settings`] - Parsed `.ddeck/config.toml`
//! - [`load_settings()`], [`init_config_dir()`]
//!
//! ### Devices
//! - [`DeviceSource`] - Seam over the SDK tools; [`SdkDeviceSource`] is the real one
//! - [`DevicesGetter`] - One reconciled list per call, with cache eviction
//! - [`LaunchCompatibilityChecker`] - Minimum API level check
//! - [`watch_devices()`] - Polling loop emitting [`WatchEvent`]s
//!
//! ### Output
//! - [`DeckEvent`] - NDJSON events for `ddeck watch --json`

pub mod checker;
pub mod config;
pub mod events;
pub mod getter;
pub mod source;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod watcher;

pub use checker::{Compatibility, LaunchCompatibilityChecker};
pub use config::{init_config_dir, load_settings, CheckerSettings, DeviceSettings, Settings};
pub use events::{connection_changes, DeckEvent, DeviceView};
pub use getter::DevicesGetter;
pub use source::{DeviceSource, LocalDeviceSource, SdkDeviceSource};
pub use watcher::{watch_devices, WatchEvent};
