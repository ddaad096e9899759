//! macOS `system_profiler` output, JSON (`-json`) and plain text.

use serde_json::Value;

use super::{after_first_colon, after_last_colon, BluetoothDevice, DisplayRecord, GpuRecord};

const USB_TEXT_BLOCKLIST: &[&str] = &[
    "usb",
    "bus",
    "host controller",
    "root hub",
    "hub",
    "product id",
    "vendor id",
    "version",
    "speed",
    "location id",
    "current",
    "manufacturer",
    "extra operating",
    "serial number",
    "pci device",
    "pci revision",
    "pci vendor",
];

const USB_JSON_BLOCKLIST: &[&str] = &["bus", "hub", "host controller", "root"];

const BLUETOOTH_BLOCKLIST: &[&str] = &[
    "address:",
    "state:",
    "chipset:",
    "firmware",
    "product id:",
    "vendor id:",
    "transport:",
    "supported services",
    "discoverable:",
    "rssi:",
    "serial number",
    "case version",
    "minor type",
];

fn data_type<'a>(json: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    json.get(key).and_then(|v| v.as_array())
}

fn str_field<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `Serial Number (system): C02ABC123` from `SPHardwareDataType`.
pub fn hardware_serial(text: &str) -> Option<String> {
    text.lines()
        .find(|l| l.contains("Serial Number"))
        .map(after_last_colon)
        .filter(|s| !s.is_empty())
}

/// GPUs from `SPDisplaysDataType -json`; `None` when the text is not JSON.
pub fn gpus_json(text: &str) -> Option<Vec<GpuRecord>> {
    let parsed: Value = serde_json::from_str(text).ok()?;
    let gpus = data_type(&parsed, "SPDisplaysDataType")?
        .iter()
        .filter_map(|gpu| {
            let name = str_field(gpu, "sppci_model").or_else(|| str_field(gpu, "_name"))?;
            let vram = str_field(gpu, "spdisplays_vram")
                .or_else(|| str_field(gpu, "sppci_vram"))
                .or_else(|| str_field(gpu, "spdisplays_vram_shared"))
                .map(str::to_string);
            Some(GpuRecord {
                name: name.to_string(),
                vram,
            })
        })
        .collect();
    Some(gpus)
}

/// GPUs from plain `SPDisplaysDataType`: a `Chipset Model:` line opens a
/// record, the next `VRAM` line belongs to it.
pub fn gpus_text(text: &str) -> Vec<GpuRecord> {
    let mut gpus: Vec<GpuRecord> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.contains("Chipset Model:") {
            gpus.push(GpuRecord {
                name: after_last_colon(line),
                vram: None,
            });
        } else if line.contains("VRAM") {
            if let Some(gpu) = gpus.last_mut() {
                if gpu.vram.is_none() {
                    gpu.vram = Some(after_last_colon(line));
                }
            }
        }
    }
    gpus
}

/// Split `1920 x 1080 @ 60.00Hz` into resolution and refresh rate.
pub fn split_refresh(value: &str) -> (String, Option<String>) {
    match value.split_once('@') {
        Some((res, hz)) => {
            let hz = hz.trim().trim_end_matches("Hz").trim();
            let rate = if hz.is_empty() {
                None
            } else {
                Some(format!("{} Hz", hz))
            };
            (res.trim().to_string(), rate)
        }
        None => (value.trim().to_string(), None),
    }
}

fn humanize_token(value: &str) -> String {
    let raw = value.strip_prefix("spdisplays_").unwrap_or(value);
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn depth_label(value: &str) -> String {
    match value {
        "CGSThirtyBitColor" => "30-Bit Color".to_string(),
        "CGSThirtytwoBitColor" => "32-Bit Color".to_string(),
        "CGSSixteenBitColor" => "16-Bit Color".to_string(),
        other => other.to_string(),
    }
}

/// Monitors from `SPDisplaysDataType -json` (`spdisplays_ndrvs` per GPU).
pub fn displays_json(text: &str) -> Option<Vec<DisplayRecord>> {
    let parsed: Value = serde_json::from_str(text).ok()?;
    let mut displays = Vec::new();

    for gpu in data_type(&parsed, "SPDisplaysDataType")? {
        let Some(monitors) = gpu.get("spdisplays_ndrvs").and_then(|v| v.as_array()) else {
            continue;
        };
        for monitor in monitors {
            let name = str_field(monitor, "_name").unwrap_or("Display").to_string();

            let mode = str_field(monitor, "_spdisplays_resolution")
                .or_else(|| str_field(monitor, "spdisplays_resolution"));
            let (mode_res, refresh_rate) = match mode {
                Some(m) => {
                    let (res, hz) = split_refresh(m);
                    (Some(res), hz)
                }
                None => (None, None),
            };
            let resolution = str_field(monitor, "_spdisplays_pixels")
                .map(str::to_string)
                .or(mode_res);

            let hdr = monitor.as_object().and_then(|obj| {
                obj.iter()
                    .find(|(k, _)| k.to_lowercase().contains("hdr"))
                    .and_then(|(_, v)| v.as_str())
                    .map(|v| v.contains("yes") || v.contains("supported"))
            });

            displays.push(DisplayRecord {
                name,
                resolution,
                refresh_rate,
                color_depth: str_field(monitor, "spdisplays_depth").map(depth_label),
                connection: str_field(monitor, "spdisplays_connection_type").map(humanize_token),
                hdr,
                primary: str_field(monitor, "spdisplays_main") == Some("spdisplays_yes"),
            });
        }
    }
    Some(displays)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Monitors from plain `SPDisplaysDataType`: the block under each
/// `Displays:` header, one record per `Name:` line at the first nesting
/// level below it.
pub fn displays_text(text: &str) -> Vec<DisplayRecord> {
    let mut displays: Vec<DisplayRecord> = Vec::new();
    let mut block_indent: Option<usize> = None;
    let mut name_indent: Option<usize> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let indent = indent_of(line);

        if trimmed == "Displays:" {
            block_indent = Some(indent);
            name_indent = None;
            continue;
        }
        let Some(block) = block_indent else {
            continue;
        };
        if indent <= block {
            block_indent = None;
            continue;
        }

        let is_header = trimmed.ends_with(':');
        if is_header && name_indent.map_or(true, |n| indent <= n) {
            name_indent = Some(indent);
            displays.push(DisplayRecord {
                name: trimmed.trim_end_matches(':').trim().to_string(),
                ..Default::default()
            });
            continue;
        }

        let Some(display) = displays.last_mut() else {
            continue;
        };
        let value = after_first_colon(trimmed);
        if trimmed.starts_with("Resolution:") {
            let (res, hz) = split_refresh(&value);
            display.resolution = Some(res);
            if hz.is_some() {
                display.refresh_rate = hz;
            }
        } else if trimmed.starts_with("UI Looks like:") {
            let (_, hz) = split_refresh(&value);
            if hz.is_some() {
                display.refresh_rate = hz;
            }
        } else if trimmed.starts_with("Framebuffer Depth:") || trimmed.starts_with("Pixel Depth:") {
            display.color_depth = Some(value);
        } else if trimmed.starts_with("Connection Type:") {
            display.connection = Some(value);
        } else if trimmed.starts_with("Main Display:") {
            display.primary = value.eq_ignore_ascii_case("yes");
        } else if trimmed.starts_with("Display Type:") && (value.contains("XDR") || value.contains("HDR")) {
            display.hdr = Some(true);
        }
    }
    displays
}

fn collect_usb_names(items: &[Value], out: &mut Vec<String>) {
    for item in items {
        if let Some(name) = str_field(item, "_name") {
            let lower = name.to_lowercase();
            if !USB_JSON_BLOCKLIST.iter().any(|b| lower.contains(b)) {
                out.push(name.to_string());
            }
        }
        if let Some(children) = item.get("_items").and_then(|v| v.as_array()) {
            collect_usb_names(children, out);
        }
    }
}

/// Device names from `SPUSBDataType -json`, walking nested hubs.
pub fn usb_json(text: &str) -> Option<Vec<String>> {
    let parsed: Value = serde_json::from_str(text).ok()?;
    let mut names = Vec::new();
    collect_usb_names(data_type(&parsed, "SPUSBDataType")?, &mut names);
    Some(names)
}

/// Device names from plain `SPUSBDataType`: header lines (`Name:`) that are
/// not buses, hubs, or property labels.
pub fn usb_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.ends_with(':'))
        .filter(|line| {
            let lower = line.to_lowercase();
            !USB_TEXT_BLOCKLIST.iter().any(|b| lower.contains(b))
        })
        .map(|line| line.split(':').next().unwrap_or("").trim().to_string())
        .filter(|name| name.len() > 5 && name.chars().any(char::is_alphabetic))
        .collect()
}

/// Paired devices from `SPBluetoothDataType -json`.
pub fn bluetooth_json(text: &str) -> Option<Vec<BluetoothDevice>> {
    let parsed: Value = serde_json::from_str(text).ok()?;
    let mut devices = Vec::new();

    for entry in data_type(&parsed, "SPBluetoothDataType")? {
        for (key, connected) in [("device_connected", true), ("device_not_connected", false)] {
            let Some(list) = entry.get(key).and_then(|v| v.as_array()) else {
                continue;
            };
            for device in list {
                if let Some(obj) = device.as_object() {
                    devices.extend(obj.keys().map(|name| BluetoothDevice {
                        name: name.clone(),
                        connected: Some(connected),
                    }));
                }
            }
        }
    }
    Some(devices)
}

/// Paired devices from plain `SPBluetoothDataType`, grouped under the
/// `Connected:` / `Not Connected:` headers.
pub fn bluetooth_text(text: &str) -> Vec<BluetoothDevice> {
    let mut devices = Vec::new();
    let mut section: Option<(usize, bool)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let indent = indent_of(line);

        match trimmed {
            "Connected:" => {
                section = Some((indent, true));
                continue;
            }
            "Not Connected:" => {
                section = Some((indent, false));
                continue;
            }
            _ => {}
        }

        let Some((section_indent, connected)) = section else {
            continue;
        };
        if indent <= section_indent {
            section = None;
            continue;
        }
        if !trimmed.ends_with(':') || indent < 10 {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if BLUETOOTH_BLOCKLIST.iter().any(|b| lower.contains(b)) {
            continue;
        }

        let name = trimmed.trim_end_matches(':').trim();
        if name.len() > 2 && !name.contains("Controller") {
            devices.push(BluetoothDevice {
                name: name.to_string(),
                connected: Some(connected),
            });
        }
    }
    devices
}

/// Battery details from `SPPowerDataType`, in display order.
pub fn power_details(text: &str) -> Vec<(&'static str, String)> {
    let mut details = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.contains("Wattage (W):") {
            details.push(("Charging Wattage", format!("{}W", after_last_colon(line))));
        } else if line.contains("Cycle Count:") {
            details.push(("Cycle Count", after_last_colon(line)));
        } else if line.contains("Condition:") {
            details.push(("Condition", after_last_colon(line)));
        } else if line.contains("Maximum Capacity:") {
            details.push(("Max Capacity", after_last_colon(line)));
        }
    }
    details
}
