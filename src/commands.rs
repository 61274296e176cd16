//! `ddeck` subcommands
//!
//! Each command loads the project settings, builds a [`DevicesGetter`] over
//! the Android SDK tools and writes its output to stdout. Diagnostics go to
//! the log file and stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ddeck_app::{
    connection_changes, init_config_dir, load_settings, watch_devices, DeckEvent, DevicesGetter,
    SdkDeviceSource, Settings, WatchEvent,
};
use ddeck_core::prelude::*;
use ddeck_core::{ConnectionTimes, Device};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::render::{render_change, render_table};

/// Capacity of the watcher's event channel
const WATCH_CHANNEL_CAPACITY: usize = 16;

/// Build a getter over the SDK tools, with the checker from settings
pub fn build_getter(settings: &Settings) -> DevicesGetter<SdkDeviceSource> {
    let source = SdkDeviceSource::detect(&settings.devices);
    if let Some(message) = source.tools().android_unavailable_message() {
        warn!("{}", message);
        eprintln!("⚠️  {}", message);
    }

    let mut getter = DevicesGetter::new(source, Arc::new(ConnectionTimes::default()));
    getter.init_checker(&settings.checker);
    getter
}

/// `ddeck list`: print the reconciled device list once
pub async fn run_list(project_path: &Path, json: bool) -> Result<()> {
    let settings = load_settings(project_path);
    let getter = build_getter(&settings);

    let devices = getter.get().await?;
    info!("Listed {} device(s)", devices.len());

    let views = getter.views(devices);
    if json {
        DeckEvent::devices_updated(views).emit();
    } else {
        print!("{}", render_table(&views));
    }

    Ok(())
}

/// `ddeck watch`: keep the device list up to date until Ctrl+C
///
/// With `json` every change is written as NDJSON events. Otherwise the table
/// is reprinted after each change, preceded by one line per connection change.
pub async fn run_watch(project_path: &Path, json: bool) -> Result<()> {
    let settings = load_settings(project_path);
    let getter = Arc::new(build_getter(&settings));
    let period = settings.devices.poll_interval();

    let (tx, mut rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(watch_devices(getter.clone(), period, tx, shutdown_rx));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut previous: Option<Vec<Device>> = None;
    let mut failure: Option<String> = None;

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(WatchEvent::DevicesUpdated(devices)) => {
                    let changes = previous
                        .as_deref()
                        .map(|previous| connection_changes(previous, &devices))
                        .unwrap_or_default();
                    report_update(&getter, &changes, devices.clone(), json);
                    previous = Some(devices);
                }
                Some(WatchEvent::Failed { message, fatal }) => {
                    if json {
                        DeckEvent::error(message.clone(), fatal).emit();
                    } else {
                        eprintln!("❌ {}", message);
                    }
                    if fatal {
                        failure = Some(message);
                        break;
                    }
                }
                None => {
                    debug!("Watcher channel closed");
                    break;
                }
            },
            _ = &mut ctrl_c => {
                info!("Ctrl+C received, stopping watcher");
                break;
            }
        }
    }

    stop_watcher(rx, shutdown_tx, task).await;

    match failure {
        Some(message) => Err(Error::process(message)),
        None => Ok(()),
    }
}

/// Stop the watcher task and wait for it
///
/// The receiver is dropped first so a watcher blocked on a full channel
/// wakes up instead of waiting for a reader that is gone.
async fn stop_watcher(
    rx: mpsc::Receiver<WatchEvent>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
) {
    drop(rx);
    let _ = shutdown_tx.send(true);
    if let Err(e) = task.await {
        warn!("Watcher task ended abnormally: {}", e);
    }
}

fn report_update(
    getter: &DevicesGetter<SdkDeviceSource>,
    changes: &[DeckEvent],
    devices: Vec<Device>,
    json: bool,
) {
    let views = getter.views(devices);
    if json {
        for change in changes {
            change.emit();
        }
        DeckEvent::devices_updated(views).emit();
    } else {
        for line in changes.iter().filter_map(render_change) {
            println!("{}", line);
        }
        println!("{}", render_table(&views));
    }
}

/// `ddeck init`: write the default `.ddeck/config.toml`
pub fn run_init(project_path: &Path) -> Result<PathBuf> {
    let path = init_config_dir(project_path)?;
    println!("Config: {}", path.display());
    Ok(path)
}
