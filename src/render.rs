//! Plain-text rendering of device lists for the terminal

use ddeck_app::{Compatibility, DeckEvent, DeviceView};
use ddeck_core::Device;

const SINCE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render devices as an aligned table
///
/// The COMPATIBILITY column only appears when a checker produced results.
pub fn render_table(views: &[DeviceView]) -> String {
    if views.is_empty() {
        return "No AVDs or connected devices found.\n".to_string();
    }

    let with_compatibility = views.iter().any(|view| view.compatibility.is_some());

    let mut header = vec!["NAME", "KEY", "TYPE", "STATUS", "API", "CONNECTED SINCE (UTC)"];
    if with_compatibility {
        header.push("COMPATIBILITY");
    }

    let rows: Vec<Vec<String>> = views
        .iter()
        .map(|view| {
            let device = &view.device;
            let mut row = vec![
                device.name().to_string(),
                device.key().to_string(),
                device.kind().to_string(),
                status(device).to_string(),
                device
                    .android_device()
                    .api_level
                    .map(|api| api.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                device
                    .connection_time()
                    .map(|time| time.format(SINCE_FORMAT).to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ];
            if with_compatibility {
                row.push(
                    view.compatibility
                        .as_ref()
                        .map(compatibility_label)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            row
        })
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(column, title)| {
            rows.iter()
                .map(|row| row[column].chars().count())
                .max()
                .unwrap_or(0)
                .max(title.len())
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = header.iter().map(|title| title.to_string()).collect();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// One line describing a connection change, `None` for other events
pub fn render_change(event: &DeckEvent) -> Option<String> {
    match event {
        DeckEvent::DeviceConnected { name, key, kind, .. } => {
            Some(format!("+ {} [{}] {} connected", name, key, kind))
        }
        DeckEvent::DeviceDisconnected { name, key, kind, .. } => {
            Some(format!("- {} [{}] {} disconnected", name, key, kind))
        }
        _ => None,
    }
}

fn status(device: &Device) -> &'static str {
    match device {
        Device::Virtual(d) if d.is_connected() => "running",
        Device::Virtual(_) => "stopped",
        Device::Physical(d) if d.android_device().running => "connected",
        Device::Physical(_) => "offline",
    }
}

fn compatibility_label(compatibility: &Compatibility) -> String {
    match compatibility {
        Compatibility::Compatible => "ok".to_string(),
        Compatibility::Incompatible { reason } => reason.clone(),
        Compatibility::Unknown => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use ddeck_core::test_utils::test_avd;
    use ddeck_core::{AndroidDevice, PhysicalDevice};

    fn time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2018-11-28T01:15:27Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn view(device: Device, compatibility: Option<Compatibility>) -> DeviceView {
        DeviceView {
            device,
            compatibility,
        }
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_table(&[]), "No AVDs or connected devices found.\n");
    }

    #[test]
    fn test_render_table() {
        let views = vec![
            view(test_avd("Pixel_2_API_Q").into(), None),
            view(
                PhysicalDevice::new(
                    "86UX00F4R",
                    "Google Pixel 3",
                    time(),
                    AndroidDevice::connected("86UX00F4R").with_api_level(Some(29)),
                )
                .into(),
                None,
            ),
        ];

        let out = render_table(&views);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME"));
        assert!(!lines[0].contains("COMPATIBILITY"));
        assert!(lines[1].starts_with("Pixel 2 API Q   Pixel_2_API_Q  virtual   stopped"));
        assert!(lines[2].starts_with("Google Pixel 3  86UX00F4R      physical  connected"));
        assert!(lines[2].ends_with("29   2018-11-28 01:15:27"));
    }

    #[test]
    fn test_render_table_with_compatibility() {
        let views = vec![view(
            test_avd("Pixel_2_API_Q").into(),
            Some(Compatibility::Incompatible {
                reason: "API level 27 is lower than the minimum 28".to_string(),
            }),
        )];

        let out = render_table(&views);

        assert!(out.lines().next().unwrap().ends_with("COMPATIBILITY"));
        assert!(out.contains("API level 27 is lower than the minimum 28"));
    }

    #[test]
    fn test_render_change() {
        let device: Device = test_avd("Pixel_3_API_Q").with_connected(true).into();

        assert_eq!(
            render_change(&DeckEvent::device_connected(&device)).as_deref(),
            Some("+ Pixel 3 API Q [Pixel_3_API_Q] virtual connected")
        );
        assert_eq!(
            render_change(&DeckEvent::device_disconnected(&device)).as_deref(),
            Some("- Pixel 3 API Q [Pixel_3_API_Q] virtual disconnected")
        );
        assert_eq!(render_change(&DeckEvent::error("x".to_string(), false)), None);
    }
}
