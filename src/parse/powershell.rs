//! `ConvertTo-Json` output from PowerShell CIM and networking cmdlets.
//!
//! A single result serializes as an object and several as an array, so
//! every entry point goes through [`records`].

use serde_json::Value;

use super::{netmask_from_prefix, BluetoothDevice, DisplayRecord, GpuRecord, InterfaceRecord, Ipv4Entry};

/// Win32_Battery reports this run time while on AC power.
const RUNTIME_UNKNOWN: u64 = 71_582_788;

const USB_SKIP: &[&str] = &["hub", "host controller", "root", "composite device"];

pub fn records(text: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(obj @ Value::Object(_)) => vec![obj],
        _ => Vec::new(),
    }
}

fn string(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number(record: &Value, key: &str) -> Option<u64> {
    record.get(key).and_then(|v| v.as_u64())
}

/// `Get-CimInstance Win32_VideoController | Select Name, AdapterRAM`
pub fn gpus(text: &str) -> Vec<GpuRecord> {
    records(text)
        .iter()
        .filter_map(|r| {
            let name = string(r, "Name")?;
            let vram = number(r, "AdapterRAM")
                .filter(|b| *b > 0)
                .map(|b| format!("{:.1} GB", b as f64 / 1024f64.powi(3)));
            Some(GpuRecord { name, vram })
        })
        .collect()
}

/// Active modes from Win32_VideoController; adapters without a current
/// mode are not driving a display.
pub fn displays(text: &str) -> Vec<DisplayRecord> {
    records(text)
        .iter()
        .filter_map(|r| {
            let width = number(r, "CurrentHorizontalResolution")?;
            let height = number(r, "CurrentVerticalResolution")?;
            Some(DisplayRecord {
                name: string(r, "Name").unwrap_or_else(|| "Display".to_string()),
                resolution: Some(format!("{} x {}", width, height)),
                refresh_rate: number(r, "CurrentRefreshRate").map(|hz| format!("{} Hz", hz)),
                color_depth: number(r, "CurrentBitsPerPixel").map(|bits| format!("{}-bit", bits)),
                ..Default::default()
            })
        })
        .collect()
}

fn is_ipv6(record: &Value) -> bool {
    match record.get("AddressFamily") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("IPv6"),
        Some(Value::Number(n)) => n.as_u64() == Some(23),
        _ => string(record, "IPAddress").map_or(false, |a| a.contains(':')),
    }
}

/// Join `Get-NetIPAddress` rows onto `Get-NetAdapter` link state, in
/// adapter order. Aliases with addresses but no adapter row (loopback)
/// are appended and counted as up.
pub fn interfaces(addresses: &str, adapters: &str) -> Vec<InterfaceRecord> {
    let mut interfaces: Vec<InterfaceRecord> = records(adapters)
        .iter()
        .filter_map(|a| {
            Some(InterfaceRecord {
                name: string(a, "Name")?,
                up: string(a, "Status").map_or(false, |s| s.eq_ignore_ascii_case("Up")),
                ..Default::default()
            })
        })
        .collect();

    for row in records(addresses) {
        let (Some(alias), Some(address)) = (string(&row, "InterfaceAlias"), string(&row, "IPAddress")) else {
            continue;
        };
        let index = match interfaces.iter().position(|i| i.name == alias) {
            Some(i) => i,
            None => {
                interfaces.push(InterfaceRecord {
                    name: alias,
                    up: true,
                    ..Default::default()
                });
                interfaces.len() - 1
            }
        };
        let iface = &mut interfaces[index];
        if is_ipv6(&row) {
            iface.ipv6.push(address.split('%').next().unwrap_or(&address).to_string());
        } else {
            iface.ipv4.push(Ipv4Entry {
                address,
                netmask: number(&row, "PrefixLength").and_then(|p| netmask_from_prefix(p as u32)),
            });
        }
    }
    interfaces
}

/// `Get-PnpDevice -PresentOnly -Class USB | Select FriendlyName`
pub fn usb_devices(text: &str) -> Vec<String> {
    records(text)
        .iter()
        .filter_map(|r| string(r, "FriendlyName"))
        .filter(|name| {
            let lower = name.to_lowercase();
            !USB_SKIP.iter().any(|s| lower.contains(s))
        })
        .collect()
}

/// `Get-PnpDevice -Class Bluetooth | Select FriendlyName, Status`. PnP
/// status reflects driver state, not the radio link, so connection is
/// left unknown.
pub fn bluetooth_devices(text: &str) -> Vec<BluetoothDevice> {
    records(text)
        .iter()
        .filter_map(|r| string(r, "FriendlyName"))
        .filter(|name| {
            let lower = name.to_lowercase();
            !lower.contains("enumerator") && !lower.contains("adapter") && !lower.contains("radio")
        })
        .map(|name| BluetoothDevice {
            name,
            connected: None,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatteryStatus {
    pub percent: f64,
    pub plugged_in: bool,
    pub minutes_remaining: Option<u64>,
}

/// `Get-CimInstance Win32_Battery | Select EstimatedChargeRemaining, BatteryStatus, EstimatedRunTime`
pub fn battery(text: &str) -> Option<BatteryStatus> {
    let record = records(text).into_iter().next()?;
    let percent = number(&record, "EstimatedChargeRemaining")? as f64;
    // BatteryStatus 1 is "discharging"; every other value implies AC.
    let plugged_in = number(&record, "BatteryStatus").map_or(false, |s| s != 1);
    let minutes_remaining = number(&record, "EstimatedRunTime").filter(|m| *m != RUNTIME_UNKNOWN);
    Some(BatteryStatus {
        percent,
        plugged_in,
        minutes_remaining,
    })
}

/// Plain `-ExpandProperty` output: one value per line.
pub fn values(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
