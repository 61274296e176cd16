//! Launch compatibility checking
//!
//! Flags devices whose API level is below the app's minimum so they can be
//! shown but not picked.

use ddeck_core::Device;
use serde::Serialize;

use crate::config::CheckerSettings;

/// Whether an app can be launched on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Compatibility {
    Compatible,
    Incompatible { reason: String },
    /// The device did not report an API level
    Unknown,
}

impl Compatibility {
    pub fn is_launchable(&self) -> bool {
        !matches!(self, Compatibility::Incompatible { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchCompatibilityChecker {
    min_api_level: u32,
}

impl LaunchCompatibilityChecker {
    pub fn new(min_api_level: u32) -> Self {
        Self { min_api_level }
    }

    /// Build a checker from settings; `None` when checking is disabled
    pub fn from_settings(settings: &CheckerSettings) -> Option<Self> {
        (settings.min_api_level > 0).then(|| Self::new(settings.min_api_level))
    }

    pub fn min_api_level(&self) -> u32 {
        self.min_api_level
    }

    pub fn check(&self, device: &Device) -> Compatibility {
        match device.android_device().api_level {
            None => Compatibility::Unknown,
            Some(api) if api >= self.min_api_level => Compatibility::Compatible,
            Some(api) => Compatibility::Incompatible {
                reason: format!(
                    "API level {} is lower than the minimum {}",
                    api, self.min_api_level
                ),
            },
        }
    }
}
