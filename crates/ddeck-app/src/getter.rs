//! Device getter: one reconciled device list per call
//!
//! Pulls both snapshots from a [`DeviceSource`], reconciles them and keeps
//! the shared [`ConnectionTimes`] limited to devices that are still connected.

use std::sync::Arc;

use ddeck_core::prelude::*;
use ddeck_core::{reconcile, ConnectedDevice, ConnectionTimes, Device, VirtualDevice};

use crate::checker::{Compatibility, LaunchCompatibilityChecker};
use crate::config::CheckerSettings;
use crate::events::DeviceView;
use crate::source::DeviceSource;

pub struct DevicesGetter<S> {
    source: S,
    times: Arc<ConnectionTimes>,
    checker: Option<LaunchCompatibilityChecker>,
}

impl<S: DeviceSource> DevicesGetter<S> {
    pub fn new(source: S, times: Arc<ConnectionTimes>) -> Self {
        Self {
            source,
            times,
            checker: None,
        }
    }

    /// Configure launch compatibility checking
    ///
    /// Leaves no checker when the settings disable it.
    pub fn init_checker(&mut self, settings: &CheckerSettings) {
        self.checker = LaunchCompatibilityChecker::from_settings(settings);
        debug!("Launch compatibility checker: {:?}", self.checker);
    }

    pub fn checker(&self) -> Option<&LaunchCompatibilityChecker> {
        self.checker.as_ref()
    }

    /// Compatibility of `device`, or `None` when no checker is configured
    pub fn compatibility(&self, device: &Device) -> Option<Compatibility> {
        self.checker.map(|checker| checker.check(device))
    }

    /// Pair each device with its compatibility
    pub fn views(&self, devices: Vec<Device>) -> Vec<DeviceView> {
        devices
            .into_iter()
            .map(|device| DeviceView {
                compatibility: self.compatibility(&device),
                device,
            })
            .collect()
    }

    pub fn connection_times(&self) -> &Arc<ConnectionTimes> {
        &self.times
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Query both sources and return the reconciled device list
    pub async fn get(&self) -> Result<Vec<Device>> {
        let (virtual_devices, connected) = tokio::join!(
            self.source.virtual_devices(),
            self.source.connected_devices()
        );

        let virtual_devices = virtual_devices?;
        let mut connected = connected?;

        Ok(self.get_impl(virtual_devices, &mut connected))
    }

    /// Reconcile the given snapshots and evict keys no longer connected
    ///
    /// `connected` is left holding the devices no AVD claimed.
    pub fn get_impl(
        &self,
        virtual_devices: Vec<VirtualDevice>,
        connected: &mut Vec<ConnectedDevice>,
    ) -> Vec<Device> {
        let devices = reconcile(virtual_devices, connected, &self.times);

        self.times.retain_keys(
            devices
                .iter()
                .filter(|device| device.is_connected())
                .map(Device::key),
        );

        devices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StaticDeviceSource;
    use ddeck_core::test_utils::{test_avd, test_emulator, test_physical};
    use ddeck_core::{Clock, FixedClock};

    const NOW: &str = "2018-11-28T01:15:27Z";

    fn getter(source: StaticDeviceSource) -> DevicesGetter<StaticDeviceSource> {
        let clock = Arc::new(FixedClock::parse(NOW).unwrap());
        DevicesGetter::new(source, Arc::new(ConnectionTimes::new(clock)))
    }

    #[tokio::test]
    async fn test_get_reconciles_both_sources() {
        let getter = getter(StaticDeviceSource::new(
            vec![test_avd("Pixel_2_API_Q"), test_avd("Pixel_3_API_Q")],
            vec![
                test_physical("86UX00F4R", "Google Pixel 3"),
                test_emulator("emulator-5554", "Pixel_3_API_Q"),
            ],
        ));

        let devices = getter.get().await.unwrap();

        let now = FixedClock::parse(NOW).unwrap().now();
        let summary: Vec<(&str, bool, Option<_>)> = devices
            .iter()
            .map(|d| (d.name(), d.is_connected(), d.connection_time()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Pixel 2 API Q", false, None),
                ("Pixel 3 API Q", true, Some(now)),
                ("Google Pixel 3", true, Some(now)),
            ]
        );
    }

    #[test]
    fn test_get_impl_leaves_unclaimed_devices() {
        let getter = getter(StaticDeviceSource::default());
        let mut connected = vec![
            test_emulator("emulator-5554", "Pixel_3_API_Q"),
            test_physical("86UX00F4R", "Google Pixel 3"),
        ];

        getter.get_impl(vec![test_avd("Pixel_3_API_Q")], &mut connected);

        assert_eq!(connected.len(), 1);
        assert_eq!(connected[0].key(), "86UX00F4R");
    }

    #[tokio::test]
    async fn test_disconnect_evicts_connection_time() {
        let source = StaticDeviceSource::new(
            vec![test_avd("Pixel_3_API_Q")],
            vec![test_emulator("emulator-5554", "Pixel_3_API_Q")],
        );
        let getter = getter(source);

        getter.get().await.unwrap();
        assert!(getter.connection_times().peek("Pixel_3_API_Q").is_some());

        getter.source().set_connected(Vec::new());
        let devices = getter.get().await.unwrap();

        assert!(!devices[0].is_connected());
        assert!(getter.connection_times().is_empty());
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let source = StaticDeviceSource::new(vec![test_avd("Pixel_3_API_Q")], Vec::new());
        source.fail_next(Error::process("adb died"));
        let getter = getter(source);

        let result = getter.get().await;

        assert!(matches!(result, Err(Error::Process { .. })));
        // Nothing was reconciled, so nothing was recorded
        assert!(getter.connection_times().is_empty());
    }

    #[test]
    fn test_init_checker() {
        let mut getter = getter(StaticDeviceSource::default());

        getter.init_checker(&CheckerSettings::default());
        assert!(getter.checker().is_none());
        assert_eq!(getter.compatibility(&test_avd("Pixel_3_API_Q").into()), None);

        getter.init_checker(&CheckerSettings { min_api_level: 26 });
        assert_eq!(getter.checker().map(|c| c.min_api_level()), Some(26));
        assert_eq!(
            getter.compatibility(&test_avd("Pixel_3_API_Q").into()),
            Some(Compatibility::Unknown)
        );

        let views = getter.views(vec![test_avd("Pixel_3_API_Q").into()]);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].compatibility, Some(Compatibility::Unknown));
    }
}
