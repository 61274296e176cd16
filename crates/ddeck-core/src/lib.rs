//! # ddeck-core - Core Domain Types
//!
//! Foundation crate for deploy-deck. Provides the device model, the
//! connection-time cache, device reconciliation, error handling and logging.
//!
//! This crate has **zero internal dependencies** and performs no I/O apart
//! from log setup.
//!
//! ## Public API
//!
//! ### Device Model (`types`)
//! - [`VirtualDevice`] - A configured AVD, connected or not
//! - [`ConnectedDevice`] - A live device reported by adb
//! - [`PhysicalDevice`] - A connected device with no AVD
//! - [`Device`] - Reconciled record (`Virtual` or `Physical`)
//! - [`AndroidDevice`] - Platform handle behind each record
//!
//! ### Reconciliation (`reconcile`)
//! - [`reconcile()`] - Merge AVDs with connected devices
//! - [`virtual_device_if_connected()`] - Claim the connected device for one AVD
//!
//! ### Time (`clock`, `connection_time`)
//! - [`Clock`], [`SystemClock`], [`FixedClock`] - Substitutable time source
//! - [`ConnectionTimes`] - First-seen instant per device key
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use ddeck_core::prelude::*;
//! ```

pub mod clock;
pub mod connection_time;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod reconcile;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use connection_time::ConnectionTimes;
pub use error::{Error, Result, ResultExt};
pub use reconcile::{reconcile, virtual_device_if_connected};
pub use types::{
    AndroidDevice, ConnectedDevice, Device, PhysicalDevice, VirtualDevice,
    EMULATOR_SERIAL_PREFIX,
};
