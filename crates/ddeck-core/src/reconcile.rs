//! Device reconciliation
//!
//! Merges the configured AVDs with the devices the bridge currently reports.
//! A running emulator keeps the identity of the AVD it was launched from;
//! whatever is left over is a physical device.

use crate::connection_time::ConnectionTimes;
use crate::types::{ConnectedDevice, Device, PhysicalDevice, VirtualDevice};

/// Reconcile configured virtual devices against connected devices
///
/// Returns the virtual devices in input order followed by one physical device
/// per unclaimed connected device, in their original order.
///
/// `connected` is consumed in place: every entry claimed by a virtual device
/// is removed, so on return it holds exactly the devices with no AVD.
pub fn reconcile(
    virtual_devices: Vec<VirtualDevice>,
    connected: &mut Vec<ConnectedDevice>,
    times: &ConnectionTimes,
) -> Vec<Device> {
    let mut devices = Vec::with_capacity(virtual_devices.len() + connected.len());

    for device in virtual_devices {
        devices.push(Device::Virtual(virtual_device_if_connected(
            device, connected, times,
        )));
    }

    devices.extend(
        connected
            .iter()
            .map(|device| Device::Physical(physical_device(device, times))),
    );

    tracing::trace!(
        "Reconciled {} device(s), {} physical",
        devices.len(),
        connected.len()
    );

    devices
}

/// Return `device` marked connected if a connected device claims it
///
/// An explicit `virtual_device_key` link wins over a running AVD name match.
/// Within each rule the first device in `connected` order wins. The claimed
/// device is removed from `connected`. With no match, `device` comes back
/// unchanged and `times` is not touched.
pub fn virtual_device_if_connected(
    device: VirtualDevice,
    connected: &mut Vec<ConnectedDevice>,
    times: &ConnectionTimes,
) -> VirtualDevice {
    let Some(index) = find_connected(&device, connected) else {
        return device;
    };

    let claimed = connected.remove(index);
    tracing::debug!("{} is running as {}", device.key(), claimed.key());

    let connection_time = times.get(device.key());
    device
        .with_connected(true)
        .with_connection_time(connection_time)
        .with_android_device(claimed.into_android_device())
}

fn find_connected(device: &VirtualDevice, connected: &[ConnectedDevice]) -> Option<usize> {
    connected
        .iter()
        .position(|c| c.virtual_device_key() == Some(device.key()))
        .or_else(|| {
            connected
                .iter()
                .position(|c| c.android_device().running_avd_name() == Some(device.key()))
        })
}

fn physical_device(device: &ConnectedDevice, times: &ConnectionTimes) -> PhysicalDevice {
    let name = device.physical_device_name().unwrap_or(device.name());
    PhysicalDevice::new(
        device.key(),
        name,
        times.get(device.key()),
        device.android_device().clone(),
    )
}
