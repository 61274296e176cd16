//! Periodic device polling
//!
//! Re-runs the getter on a fixed period and reports the device list whenever
//! it changes. Recoverable errors are reported and retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use ddeck_core::prelude::*;
use ddeck_core::Device;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::getter::DevicesGetter;
use crate::source::DeviceSource;

/// Output of the watch loop
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// The reconciled device list differs from the last one sent
    DevicesUpdated(Vec<Device>),
    /// A poll failed; the loop stops after a fatal failure
    Failed { message: String, fatal: bool },
}

/// Poll `getter` every `period` until `shutdown_rx` flips to `true`
///
/// Also stops when the receiver of `tx` is dropped or a fatal error occurs.
pub async fn watch_devices<S>(
    getter: Arc<DevicesGetter<S>>,
    period: Duration,
    tx: mpsc::Sender<WatchEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    S: DeviceSource + Sync,
{
    let mut tick = tokio::time::interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last: Option<Vec<Device>> = None;

    info!("Device watcher started ({:?} period)", period);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                match getter.get().await {
                    Ok(devices) => {
                        if last.as_ref() == Some(&devices) {
                            continue;
                        }
                        last = Some(devices.clone());
                        if tx.send(WatchEvent::DevicesUpdated(devices)).await.is_err() {
                            debug!("Device watcher receiver dropped");
                            break;
                        }
                    }
                    Err(e) => {
                        let fatal = e.is_fatal();
                        if fatal {
                            error!("Device poll failed: {}", e);
                        } else {
                            warn!("Device poll failed, retrying next tick: {}", e);
                        }

                        let event = WatchEvent::Failed {
                            message: e.to_string(),
                            fatal,
                        };
                        if tx.send(event).await.is_err() || fatal {
                            break;
                        }
                    }
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!("Device watcher: shutdown signal received");
                    break;
                }
            }
        }
    }
}
