//! Test utilities for the device getter and watcher
//!
//! Provides an in-memory [`DeviceSource`] whose snapshots can be swapped
//! between polls.

use std::sync::Mutex;

use ddeck_core::prelude::*;
use ddeck_core::{ConnectedDevice, VirtualDevice};

use crate::source::DeviceSource;

/// Device source serving whatever snapshot it currently holds
#[derive(Debug, Default)]
pub struct StaticDeviceSource {
    virtual_devices: Mutex<Vec<VirtualDevice>>,
    connected: Mutex<Vec<ConnectedDevice>>,
    failure: Mutex<Option<Error>>,
}

impl StaticDeviceSource {
    pub fn new(virtual_devices: Vec<VirtualDevice>, connected: Vec<ConnectedDevice>) -> Self {
        Self {
            virtual_devices: Mutex::new(virtual_devices),
            connected: Mutex::new(connected),
            failure: Mutex::new(None),
        }
    }

    /// Replace the connected-device snapshot served from now on
    pub fn set_connected(&self, connected: Vec<ConnectedDevice>) {
        *self.connected.lock().unwrap() = connected;
    }

    /// Replace the virtual-device snapshot served from now on
    pub fn set_virtual_devices(&self, virtual_devices: Vec<VirtualDevice>) {
        *self.virtual_devices.lock().unwrap() = virtual_devices;
    }

    /// Make the next connected-device query fail with `error`
    pub fn fail_next(&self, error: Error) {
        *self.failure.lock().unwrap() = Some(error);
    }
}

impl DeviceSource for StaticDeviceSource {
    async fn virtual_devices(&self) -> Result<Vec<VirtualDevice>> {
        Ok(self.virtual_devices.lock().unwrap().clone())
    }

    async fn connected_devices(&self) -> Result<Vec<ConnectedDevice>> {
        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.connected.lock().unwrap().clone())
    }
}
