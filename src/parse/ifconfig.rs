//! `ifconfig` output, BSD/macOS and Linux net-tools flavours.

use super::{netmask_from_hex, InterfaceRecord, Ipv4Entry};

fn token_after<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let mut tokens = line.split_whitespace();
    while let Some(t) = tokens.next() {
        if t == key {
            return tokens.next();
        }
        if let Some(v) = t.strip_prefix(key).and_then(|r| r.strip_prefix(':')) {
            return Some(v);
        }
    }
    None
}

fn normalize_mask(mask: &str) -> String {
    netmask_from_hex(mask).unwrap_or_else(|| mask.to_string())
}

pub fn interfaces(output: &str) -> Vec<InterfaceRecord> {
    let mut interfaces: Vec<InterfaceRecord> = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if !line.starts_with('\t') && !line.starts_with(' ') {
            let name = line
                .split(|c: char| c == ':' || c.is_whitespace())
                .next()
                .unwrap_or("")
                .to_string();
            interfaces.push(InterfaceRecord {
                name,
                up: line.contains("<UP") || line.contains(",UP"),
                ..Default::default()
            });
            continue;
        }

        let Some(current) = interfaces.last_mut() else {
            continue;
        };
        let trimmed = line.trim();

        if trimmed.starts_with("UP ") {
            current.up = true;
        } else if trimmed.starts_with("inet6") {
            // net-tools: `inet6 addr: 2001:db8::9/64 Scope:Global`
            let addr = trimmed
                .split_whitespace()
                .skip(1)
                .find(|t| *t != "addr:")
                .map(|a| a.split(['%', '/']).next().unwrap_or(a).to_string());
            if let Some(addr) = addr {
                current.ipv6.push(addr);
            }
        } else if trimmed.starts_with("inet") {
            let address = match token_after(trimmed, "inet") {
                Some(a) if a.starts_with("addr:") => a.trim_start_matches("addr:").to_string(),
                Some(a) => a.to_string(),
                None => continue,
            };
            let netmask = token_after(trimmed, "netmask")
                .or_else(|| token_after(trimmed, "Mask"))
                .map(normalize_mask);
            current.ipv4.push(Ipv4Entry { address, netmask });
        }
    }

    interfaces
}
