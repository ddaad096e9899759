use std::net::IpAddr;

use crate::error::CollectError;
use crate::parse::{ifconfig, ip, labelled, powershell, resolv, InterfaceRecord};
use crate::platform::Os;
use crate::probe::Host;
use crate::report::Section;

pub const HEADING: &str = "🌐 Network";

const MAX_DNS: usize = 3;

const VPN_MARKERS: &[&str] = &["tun", "tap", "vpn", "utun"];

const ADDRESS_QUERY: &str = "Get-NetIPAddress | Select-Object InterfaceAlias, IPAddress, @{n='AddressFamily';e={$_.AddressFamily.ToString()}}, PrefixLength | ConvertTo-Json";
const ADAPTER_QUERY: &str = "Get-NetAdapter | Select-Object Name, Status | ConvertTo-Json";
const GATEWAY_QUERY: &str = "Get-NetRoute -DestinationPrefix 0.0.0.0/0 | Sort-Object RouteMetric | Select-Object -First 1 -ExpandProperty NextHop";
const DNS_QUERY: &str = "Get-DnsClientServerAddress -AddressFamily IPv4 | Select-Object -ExpandProperty ServerAddresses";

#[derive(Debug, Clone, Default)]
pub struct NetworkFacts {
    pub interfaces: Vec<InterfaceRecord>,
    pub gateway: Option<String>,
    pub dns_servers: Vec<String>,
    pub external_ip: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpnStatus {
    Active,
    NotDetected,
    Unknown,
}

impl VpnStatus {
    pub fn label(self) -> &'static str {
        match self {
            VpnStatus::Active => "Active",
            VpnStatus::NotDetected => "Not detected",
            VpnStatus::Unknown => "Unknown",
        }
    }
}

/// Name-based heuristic: any up interface that looks like a tunnel.
pub fn vpn_status(interfaces: &[InterfaceRecord]) -> VpnStatus {
    if interfaces.is_empty() {
        return VpnStatus::Unknown;
    }
    let tunnel_up = interfaces.iter().any(|iface| {
        let name = iface.name.to_lowercase();
        iface.up && VPN_MARKERS.iter().any(|m| name.contains(m))
    });
    if tunnel_up {
        VpnStatus::Active
    } else {
        VpnStatus::NotDetected
    }
}

fn is_hidden(name: &str) -> bool {
    (name.starts_with("lo") && !name.starts_with("local"))
        || name.starts_with("utun")
        || name.to_lowercase().contains("loopback")
}

pub fn render(facts: &NetworkFacts) -> Vec<String> {
    let mut section = Section::spaced(HEADING);

    for iface in facts.interfaces.iter().filter(|i| i.up && !is_hidden(&i.name)) {
        section.subheading(&iface.name).field("Status", "Up");
        for v4 in &iface.ipv4 {
            section.field("IPv4", &v4.address);
            if let Some(mask) = &v4.netmask {
                section.sub_field("Netmask", mask);
            }
        }
        for v6 in iface.ipv6.iter().filter(|a| !a.starts_with("fe80")) {
            section.field("IPv6", v6);
        }
    }

    if let Some(gateway) = &facts.gateway {
        section.spaced_field("Default Gateway", gateway);
    }
    if !facts.dns_servers.is_empty() {
        let servers: Vec<&str> = facts
            .dns_servers
            .iter()
            .take(MAX_DNS)
            .map(String::as_str)
            .collect();
        section.field("DNS Servers", servers.join(", "));
    }
    section.field(
        "External IP",
        facts.external_ip.as_deref().unwrap_or("Unable to determine"),
    );
    section.field("VPN Status", vpn_status(&facts.interfaces).label());

    section.into_lines()
}

// ── Probes ──────────────────────────────────────────────

pub async fn interfaces(host: &Host) -> Vec<InterfaceRecord> {
    match host.os() {
        Os::Linux => {
            if let Some(found) = host
                .run("ip", &["-j", "addr"])
                .await
                .and_then(|json| ip::interfaces(&json))
            {
                return found;
            }
            host.run("ifconfig", &[])
                .await
                .map(|text| ifconfig::interfaces(&text))
                .unwrap_or_default()
        }
        Os::MacOS => host
            .run("ifconfig", &[])
            .await
            .map(|text| ifconfig::interfaces(&text))
            .unwrap_or_default(),
        Os::Windows => {
            let Some(addresses) = host.powershell(ADDRESS_QUERY).await else {
                return Vec::new();
            };
            let adapters = host.powershell(ADAPTER_QUERY).await.unwrap_or_default();
            powershell::interfaces(&addresses, &adapters)
        }
        Os::Unsupported => Vec::new(),
    }
}

async fn default_gateway(host: &Host) -> Option<String> {
    match host.os() {
        Os::MacOS => host
            .run("route", &["-n", "get", "default"])
            .await
            .and_then(|out| labelled(&out, "gateway:")),
        Os::Linux => host
            .run("ip", &["route", "show", "default"])
            .await
            .and_then(|out| ip::default_gateway(&out)),
        Os::Windows => host
            .powershell(GATEWAY_QUERY)
            .await
            .and_then(|out| powershell::values(&out).into_iter().next()),
        Os::Unsupported => None,
    }
}

async fn dns_servers(host: &Host) -> Vec<String> {
    let servers = match host.os() {
        Os::MacOS => match host.run("scutil", &["--dns"]).await {
            Some(out) => resolv::scutil_nameservers(&out),
            None => Vec::new(),
        },
        Os::Linux => Vec::new(),
        Os::Windows => host
            .powershell(DNS_QUERY)
            .await
            .map(|out| powershell::values(&out))
            .unwrap_or_default(),
        Os::Unsupported => return Vec::new(),
    };
    let servers = if servers.is_empty() && host.os().is_unix() {
        host.read_file("/etc/resolv.conf")
            .await
            .map(|conf| resolv::nameservers(&conf))
            .unwrap_or_default()
    } else {
        servers
    };

    let mut unique: Vec<String> = Vec::new();
    for server in servers {
        if !unique.contains(&server) {
            unique.push(server);
        }
    }
    unique
}

/// Public address as seen by the lookup service; anything that does not
/// parse as an IP address is treated as a failed lookup.
pub async fn external_ip(host: &Host) -> Option<String> {
    let body = host.fetch_text(&host.external_ip_url).await?;
    body.trim().parse::<IpAddr>().ok().map(|ip| ip.to_string())
}

pub async fn collect(host: &Host) -> Result<Vec<String>, CollectError> {
    let facts = NetworkFacts {
        interfaces: interfaces(host).await,
        gateway: default_gateway(host).await,
        dns_servers: dns_servers(host).await,
        external_ip: external_ip(host).await,
    };
    Ok(render(&facts))
}
