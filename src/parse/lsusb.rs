//! `lsusb` listing.

const HUB_MARKERS: &[&str] = &["root hub", "Hub"];

/// Device descriptions: `Bus 001 Device 003: ID 046d:c52b Logitech, Inc. Unifying Receiver`.
/// Everything after the vendor:product id is the name; hubs are dropped.
pub fn devices(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.splitn(7, ' ').collect();
            let name = parts.get(6)?.trim();
            if name.is_empty() || HUB_MARKERS.iter().any(|m| name.contains(m)) {
                return None;
            }
            Some(name.to_string())
        })
        .collect()
}
