//! Device domain types
//!
//! - [`AndroidDevice`] - platform handle for a configured AVD or a live device
//! - [`VirtualDevice`] - a configured AVD, connected or not
//! - [`ConnectedDevice`] - a live device reported by the device bridge
//! - [`PhysicalDevice`] - a connected device with no matching AVD
//! - [`Device`] - the reconciled record, one of the two above

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Serial prefix adb uses for local emulator instances
pub const EMULATOR_SERIAL_PREFIX: &str = "emulator-";

/// Platform handle behind a device record
///
/// For a configured AVD this describes the launchable configuration. For a
/// live device it describes the running instance and is the richer of the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AndroidDevice {
    /// adb serial, present only for live devices
    pub serial: Option<String>,

    /// AVD name. For a live emulator this is the AVD it was launched from.
    pub avd_name: Option<String>,

    /// API level (e.g. 29), when known
    pub api_level: Option<u32>,

    /// Whether the device is currently running
    pub running: bool,

    /// Whether the device is an emulator instance
    pub emulator: bool,
}

impl AndroidDevice {
    /// Handle for an AVD that can be launched but is not running
    pub fn launchable(avd_name: impl Into<String>) -> Self {
        Self {
            serial: None,
            avd_name: Some(avd_name.into()),
            api_level: None,
            running: false,
            emulator: true,
        }
    }

    /// Handle for a live device reachable through adb
    pub fn connected(serial: impl Into<String>) -> Self {
        let serial = serial.into();
        let emulator = serial.starts_with(EMULATOR_SERIAL_PREFIX);
        Self {
            serial: Some(serial),
            avd_name: None,
            api_level: None,
            running: true,
            emulator,
        }
    }

    pub fn with_avd_name(mut self, avd_name: impl Into<String>) -> Self {
        self.avd_name = Some(avd_name.into());
        self
    }

    pub fn with_api_level(mut self, api_level: Option<u32>) -> Self {
        self.api_level = api_level;
        self
    }

    /// The AVD name of the running emulator, if this handle is one
    pub fn running_avd_name(&self) -> Option<&str> {
        if self.running {
            self.avd_name.as_deref()
        } else {
            None
        }
    }
}

/// A configured virtual device (AVD)
///
/// Immutable once built. Use [`VirtualDevice::new`] and the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualDevice {
    key: String,
    name: String,
    connected: bool,
    connection_time: Option<DateTime<Utc>>,
    android_device: AndroidDevice,
}

impl VirtualDevice {
    /// A disconnected virtual device
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        android_device: AndroidDevice,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            connected: false,
            connection_time: None,
            android_device,
        }
    }

    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    pub fn with_connection_time(mut self, connection_time: DateTime<Utc>) -> Self {
        self.connection_time = Some(connection_time);
        self
    }

    pub fn with_android_device(mut self, android_device: AndroidDevice) -> Self {
        self.android_device = android_device;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn connection_time(&self) -> Option<DateTime<Utc>> {
        self.connection_time
    }

    pub fn android_device(&self) -> &AndroidDevice {
        &self.android_device
    }
}

/// A live device as reported by the device bridge
///
/// `virtual_device_key` links an emulator instance to its AVD. A device with
/// no link is treated as physical unless it matches an AVD by running name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedDevice {
    key: String,
    name: String,
    virtual_device_key: Option<String>,
    physical_device_name: Option<String>,
    android_device: AndroidDevice,
}

impl ConnectedDevice {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        android_device: AndroidDevice,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            virtual_device_key: None,
            physical_device_name: None,
            android_device,
        }
    }

    pub fn with_virtual_device_key(mut self, key: impl Into<String>) -> Self {
        self.virtual_device_key = Some(key.into());
        self
    }

    pub fn with_physical_device_name(mut self, name: impl Into<String>) -> Self {
        self.physical_device_name = Some(name.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn virtual_device_key(&self) -> Option<&str> {
        self.virtual_device_key.as_deref()
    }

    pub fn physical_device_name(&self) -> Option<&str> {
        self.physical_device_name.as_deref()
    }

    pub fn android_device(&self) -> &AndroidDevice {
        &self.android_device
    }

    pub(crate) fn into_android_device(self) -> AndroidDevice {
        self.android_device
    }
}

/// A connected device that no configured AVD claimed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhysicalDevice {
    key: String,
    name: String,
    connection_time: DateTime<Utc>,
    android_device: AndroidDevice,
}

impl PhysicalDevice {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        connection_time: DateTime<Utc>,
        android_device: AndroidDevice,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            connection_time,
            android_device,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connection_time(&self) -> DateTime<Utc> {
        self.connection_time
    }

    pub fn android_device(&self) -> &AndroidDevice {
        &self.android_device
    }
}

/// A reconciled device record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Device {
    Virtual(VirtualDevice),
    Physical(PhysicalDevice),
}

impl Device {
    pub fn key(&self) -> &str {
        match self {
            Device::Virtual(d) => d.key(),
            Device::Physical(d) => d.key(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Device::Virtual(d) => d.name(),
            Device::Physical(d) => d.name(),
        }
    }

    /// Physical devices are connected by definition
    pub fn is_connected(&self) -> bool {
        match self {
            Device::Virtual(d) => d.is_connected(),
            Device::Physical(_) => true,
        }
    }

    pub fn connection_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Device::Virtual(d) => d.connection_time(),
            Device::Physical(d) => Some(d.connection_time()),
        }
    }

    pub fn android_device(&self) -> &AndroidDevice {
        match self {
            Device::Virtual(d) => d.android_device(),
            Device::Physical(d) => d.android_device(),
        }
    }

    /// Short label for the device kind
    pub fn kind(&self) -> &'static str {
        match self {
            Device::Virtual(_) => "virtual",
            Device::Physical(_) => "physical",
        }
    }
}

impl From<VirtualDevice> for Device {
    fn from(device: VirtualDevice) -> Self {
        Device::Virtual(device)
    }
}

impl From<PhysicalDevice> for Device {
    fn from(device: PhysicalDevice) -> Self {
        Device::Physical(device)
    }
}
