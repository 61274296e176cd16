//! NDJSON event output for `ddeck watch --json`
//!
//! One JSON object per line, each tagged with an `event` field.
//!
//! # Example Output
//!
//! ```json
//! {"event":"devices_updated","devices":[...],"timestamp":1704700001000}
//! {"event":"device_connected","key":"Pixel_3_API_Q","name":"Pixel 3 API Q","kind":"virtual","timestamp":1704700003000}
//! {"event":"error","message":"adb not found...","fatal":true,"timestamp":1704700004000}
//! ```

use std::collections::HashSet;
use std::io::{self, Write};

use chrono::Utc;
use ddeck_core::Device;
use serde::Serialize;
use tracing::error;

use crate::checker::Compatibility;

/// A device together with its launch compatibility
#[derive(Debug, Clone, Serialize)]
pub struct DeviceView {
    pub device: Device,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<Compatibility>,
}

/// Events emitted on stdout
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeckEvent {
    /// Full reconciled list after a change
    DevicesUpdated {
        devices: Vec<DeviceView>,
        timestamp: i64,
    },

    /// A device became connected since the previous list
    DeviceConnected {
        key: String,
        name: String,
        kind: &'static str,
        timestamp: i64,
    },

    /// A device is no longer connected
    DeviceDisconnected {
        key: String,
        name: String,
        kind: &'static str,
        timestamp: i64,
    },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl DeckEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn devices_updated(devices: Vec<DeviceView>) -> Self {
        Self::DevicesUpdated {
            devices,
            timestamp: Self::now(),
        }
    }

    pub fn device_connected(device: &Device) -> Self {
        Self::DeviceConnected {
            key: device.key().to_string(),
            name: device.name().to_string(),
            kind: device.kind(),
            timestamp: Self::now(),
        }
    }

    pub fn device_disconnected(device: &Device) -> Self {
        Self::DeviceDisconnected {
            key: device.key().to_string(),
            name: device.name().to_string(),
            kind: device.kind(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }
}

/// Connection changes between two device lists
///
/// Disconnections come first, then connections, each in list order.
pub fn connection_changes(previous: &[Device], current: &[Device]) -> Vec<DeckEvent> {
    let connected_keys = |devices: &[Device]| -> HashSet<String> {
        devices
            .iter()
            .filter(|d| d.is_connected())
            .map(|d| d.key().to_string())
            .collect()
    };

    let before = connected_keys(previous);
    let after = connected_keys(current);

    let disconnected = previous
        .iter()
        .filter(|d| d.is_connected() && !after.contains(d.key()))
        .map(DeckEvent::device_disconnected);

    let connected = current
        .iter()
        .filter(|d| d.is_connected() && !before.contains(d.key()))
        .map(DeckEvent::device_connected);

    disconnected.chain(connected).collect()
}
