//! Tool availability checking for device management
//!
//! Locates the two Android SDK tools deploy-deck needs: `adb` (connected
//! devices) and `emulator` (configured AVDs).

use std::path::{Path, PathBuf};

/// Resolved paths of external tools
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolAvailability {
    /// Path to `adb` if found
    pub adb_path: Option<PathBuf>,

    /// Path to `emulator` if found
    pub emulator_path: Option<PathBuf>,
}

/// An Android SDK tool and where it lives inside the SDK
#[derive(Debug, Clone, Copy)]
struct SdkTool {
    name: &'static str,
    sdk_subdir: &'static str,
}

const ADB: SdkTool = SdkTool {
    name: "adb",
    sdk_subdir: "platform-tools",
};

const EMULATOR: SdkTool = SdkTool {
    name: "emulator",
    sdk_subdir: "emulator",
};

impl ToolAvailability {
    /// Check tool availability (run once at startup)
    ///
    /// Explicit paths win when they exist. Otherwise `PATH` is searched,
    /// then `ANDROID_HOME` and `ANDROID_SDK_ROOT`.
    pub fn check(adb_override: Option<&Path>, emulator_override: Option<&Path>) -> Self {
        let adb_path = Self::locate(ADB, adb_override);
        let emulator_path = Self::locate(EMULATOR, emulator_override);

        tracing::debug!(
            "Tool availability: adb={:?} emulator={:?}",
            adb_path,
            emulator_path
        );

        Self {
            adb_path,
            emulator_path,
        }
    }

    fn locate(tool: SdkTool, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Some(canonical(path));
            }
            tracing::warn!(
                "Configured {} path {} does not exist, falling back to detection",
                tool.name,
                path.display()
            );
        }

        if let Ok(path) = which::which(tool.name) {
            return Some(canonical(&path));
        }

        Self::get_sdk_paths(tool)
            .into_iter()
            .find(|candidate| candidate.is_file())
            .map(|path| canonical(&path))
    }

    /// Get SDK-relative locations to try for a tool
    fn get_sdk_paths(tool: SdkTool) -> Vec<PathBuf> {
        let executable = if cfg!(windows) {
            format!("{}.exe", tool.name)
        } else {
            tool.name.to_string()
        };

        ["ANDROID_HOME", "ANDROID_SDK_ROOT"]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .map(|root| PathBuf::from(root).join(tool.sdk_subdir).join(&executable))
            .collect()
    }

    pub fn has_adb(&self) -> bool {
        self.adb_path.is_some()
    }

    pub fn has_emulator(&self) -> bool {
        self.emulator_path.is_some()
    }

    /// Get user-friendly message for unavailable Android tools
    pub fn android_unavailable_message(&self) -> Option<&'static str> {
        match (self.has_adb(), self.has_emulator()) {
            (true, true) => None,
            (false, false) => {
                Some("Android SDK not found. Set ANDROID_HOME or install Android Studio.")
            }
            (false, true) => Some("adb not found. Connected devices will not be listed."),
            (true, false) => Some("Android emulator not found. AVDs will not be listed."),
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
