use crate::error::CollectError;
use crate::parse::{bluetoothctl, lsusb, powershell, system_profiler, BluetoothDevice};
use crate::platform::Os;
use crate::probe::Host;
use crate::report::Section;

pub const HEADING: &str = "🔌 Connected Devices";

const MAX_DEVICES: usize = 25;

const USB_QUERY: &str = "Get-PnpDevice -PresentOnly -Class USB | Select-Object FriendlyName | ConvertTo-Json";
const BLUETOOTH_QUERY: &str = "Get-PnpDevice -PresentOnly -Class Bluetooth | Select-Object FriendlyName, Status | ConvertTo-Json";

pub async fn usb_devices(host: &Host) -> Vec<String> {
    match host.os() {
        Os::MacOS => {
            if let Some(json) = host.run("system_profiler", &["SPUSBDataType", "-json"]).await {
                if let Some(names) = system_profiler::usb_json(&json) {
                    return names;
                }
            }
            host.run("system_profiler", &["SPUSBDataType"])
                .await
                .map(|text| system_profiler::usb_text(&text))
                .unwrap_or_default()
        }
        Os::Linux => host
            .run("lsusb", &[])
            .await
            .map(|text| lsusb::devices(&text))
            .unwrap_or_default(),
        Os::Windows => host
            .powershell(USB_QUERY)
            .await
            .map(|json| powershell::usb_devices(&json))
            .unwrap_or_default(),
        Os::Unsupported => Vec::new(),
    }
}

async fn linux_bluetooth(host: &Host) -> Vec<BluetoothDevice> {
    let Some(known) = host.run("bluetoothctl", &["devices"]).await else {
        return Vec::new();
    };
    let connected: Option<Vec<String>> = host
        .run("bluetoothctl", &["devices", "Connected"])
        .await
        .map(|text| {
            bluetoothctl::devices(&text)
                .into_iter()
                .map(|(address, _)| address)
                .collect()
        });

    bluetoothctl::devices(&known)
        .into_iter()
        .map(|(address, name)| BluetoothDevice {
            name,
            connected: connected.as_ref().map(|c| c.contains(&address)),
        })
        .collect()
}

pub async fn bluetooth_devices(host: &Host) -> Vec<BluetoothDevice> {
    match host.os() {
        Os::MacOS => {
            if let Some(json) = host
                .run("system_profiler", &["SPBluetoothDataType", "-json"])
                .await
            {
                if let Some(devices) = system_profiler::bluetooth_json(&json) {
                    return devices;
                }
            }
            host.run("system_profiler", &["SPBluetoothDataType"])
                .await
                .map(|text| system_profiler::bluetooth_text(&text))
                .unwrap_or_default()
        }
        Os::Linux => linux_bluetooth(host).await,
        Os::Windows => host
            .powershell(BLUETOOTH_QUERY)
            .await
            .map(|json| powershell::bluetooth_devices(&json))
            .unwrap_or_default(),
        Os::Unsupported => Vec::new(),
    }
}

pub fn render(usb: &[String], bluetooth: &[BluetoothDevice]) -> Vec<String> {
    let mut section = Section::new(HEADING);

    if !usb.is_empty() {
        section.line("### USB Devices");
        for name in usb.iter().take(MAX_DEVICES) {
            section.item(name);
        }
    }

    if !bluetooth.is_empty() {
        section.line("").line("### Bluetooth Devices");
        for device in bluetooth.iter().take(MAX_DEVICES) {
            let line = match device.connected {
                Some(true) => format!("- **{}** (Connected)", device.name),
                Some(false) => format!("- **{}** (Paired, not connected)", device.name),
                None => format!("- **{}**", device.name),
            };
            section.line(line);
        }
    }

    section.into_lines()
}

pub async fn collect(host: &Host) -> Result<Vec<String>, CollectError> {
    let usb = usb_devices(host).await;
    let bluetooth = bluetooth_devices(host).await;
    Ok(render(&usb, &bluetooth))
}
