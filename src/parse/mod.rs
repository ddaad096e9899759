//! Parsers for third-party diagnostic command output.
//!
//! Each submodule handles one tool's format. Parsers take raw text (which
//! may be empty), never fail, and return plain records.

pub mod bluetoothctl;
pub mod ifconfig;
pub mod ip;
pub mod lsof;
pub mod lspci;
pub mod lsusb;
pub mod netstat;
pub mod pmset;
pub mod powershell;
pub mod resolv;
pub mod ss;
pub mod system_profiler;
pub mod xrandr;

use std::net::Ipv4Addr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuRecord {
    pub name: String,
    pub vram: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayRecord {
    pub name: String,
    pub resolution: Option<String>,
    pub refresh_rate: Option<String>,
    pub color_depth: Option<String>,
    pub connection: Option<String>,
    pub hdr: Option<bool>,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Entry {
    pub address: String,
    pub netmask: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub name: String,
    pub up: bool,
    pub ipv4: Vec<Ipv4Entry>,
    pub ipv6: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BluetoothDevice {
    pub name: String,
    /// `None` when the source does not report link state.
    pub connected: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn label(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Listen,
    Established,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketRecord {
    pub protocol: Protocol,
    pub local_ip: String,
    pub local_port: u16,
    pub remote: Option<(String, u16)>,
    pub state: SocketState,
    pub pid: Option<u32>,
    /// Process name as reported by the socket tool itself, if any.
    pub process: Option<String>,
}

/// Text after the last colon on a line, trimmed.
pub fn after_last_colon(line: &str) -> String {
    line.rsplit(':').next().unwrap_or("").trim().to_string()
}

/// Text after the first colon on a line, trimmed.
pub fn after_first_colon(line: &str) -> String {
    line.split_once(':')
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default()
}

/// Value of the first line containing `label`, taken after its first colon.
pub fn labelled(text: &str, label: &str) -> Option<String> {
    text.lines()
        .find(|l| l.contains(label))
        .map(after_first_colon)
        .filter(|v| !v.is_empty())
}

pub fn netmask_from_prefix(prefix: u32) -> Option<String> {
    if prefix > 32 {
        return None;
    }
    let bits = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    };
    Some(Ipv4Addr::from(bits).to_string())
}

/// macOS ifconfig prints masks as `0xffffff00`.
pub fn netmask_from_hex(hex: &str) -> Option<String> {
    let digits = hex.strip_prefix("0x")?;
    u32::from_str_radix(digits, 16)
        .ok()
        .map(|bits| Ipv4Addr::from(bits).to_string())
}

/// Split `host:port`, `[v6]:port`, or `*:port`. With `dot_port` the port
/// follows the last dot instead (BSD netstat: `127.0.0.1.631`, `*.22`).
pub fn split_endpoint(endpoint: &str, dot_port: bool) -> Option<(String, u16)> {
    let sep = if dot_port { '.' } else { ':' };
    let (host, port) = endpoint.rsplit_once(sep)?;
    let port = port.parse::<u16>().ok()?;
    let host = host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split('%')
        .next()
        .unwrap_or("")
        .to_string();
    let host = if host == "*" || host.is_empty() {
        "0.0.0.0".to_string()
    } else {
        host
    };
    Some((host, port))
}

/// Truncate to `max` characters on a char boundary.
pub fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Keep the last `keep` characters behind a `...` marker when `s` is longer
/// than `max`.
pub fn ellipsize_front(s: &str, max: usize, keep: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - keep).collect();
    format!("...{}", tail)
}
