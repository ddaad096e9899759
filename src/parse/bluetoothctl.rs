//! `bluetoothctl devices [Connected]`.

/// Known devices: `Device AA:BB:CC:DD:EE:FF Name with spaces`.
/// Returns `(address, name)` pairs.
pub fn devices(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.trim().splitn(3, ' ');
            if parts.next()? != "Device" {
                return None;
            }
            let address = parts.next()?.to_string();
            let name = parts.next()?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some((address, name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_lines_split_into_address_and_name() {
        let text = "Device 11:22:33:44:55:66 WH-1000XM4\nDevice AA:BB:CC:DD:EE:FF Logitech MX Keys\nController 00:11:22:33:44:55 laptop [default]\n";
        assert_eq!(
            devices(text),
            vec![
                ("11:22:33:44:55:66".to_string(), "WH-1000XM4".to_string()),
                ("AA:BB:CC:DD:EE:FF".to_string(), "Logitech MX Keys".to_string()),
            ]
        );
    }
}
