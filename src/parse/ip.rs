//! iproute2 output: `ip -j addr` and `ip route show default`.

use super::{netmask_from_prefix, InterfaceRecord, Ipv4Entry};

pub fn interfaces(json_str: &str) -> Option<Vec<InterfaceRecord>> {
    let parsed: Vec<serde_json::Value> = serde_json::from_str(json_str).ok()?;

    let interfaces = parsed
        .iter()
        .filter_map(|iface| {
            let name = iface.get("ifname").and_then(|v| v.as_str())?.to_string();

            let up = iface
                .get("flags")
                .and_then(|f| f.as_array())
                .map(|flags| flags.iter().any(|f| f.as_str() == Some("UP")))
                .unwrap_or(false);

            let mut record = InterfaceRecord {
                name,
                up,
                ..Default::default()
            };

            let addrs = iface
                .get("addr_info")
                .and_then(|a| a.as_array())
                .cloned()
                .unwrap_or_default();
            for addr in &addrs {
                let Some(local) = addr.get("local").and_then(|l| l.as_str()) else {
                    continue;
                };
                match addr.get("family").and_then(|f| f.as_str()) {
                    Some("inet") => record.ipv4.push(Ipv4Entry {
                        address: local.to_string(),
                        netmask: addr
                            .get("prefixlen")
                            .and_then(|p| p.as_u64())
                            .and_then(|p| netmask_from_prefix(p as u32)),
                    }),
                    Some("inet6") => record.ipv6.push(local.to_string()),
                    _ => {}
                }
            }
            Some(record)
        })
        .collect();

    Some(interfaces)
}

/// `default via 192.168.1.1 dev wlp2s0 proto dhcp metric 600`
pub fn default_gateway(text: &str) -> Option<String> {
    text.lines()
        .find(|l| l.starts_with("default"))
        .and_then(|l| l.split_whitespace().nth(2))
        .map(str::to_string)
}
