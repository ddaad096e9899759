use std::collections::HashMap;

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

use crate::error::CollectError;
use crate::parse::{lsof, netstat, ss, truncate, Protocol, SocketRecord, SocketState};
use crate::platform::Os;
use crate::probe::Host;
use crate::report::{warning_line, Section};

pub const HEADING: &str = "🌐 Network Ports";

const PROCESS_WIDTH: usize = 25;
const TOP_REMOTE_HOSTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub port: u16,
    pub protocol: &'static str,
    pub ip: String,
    pub process: String,
    pub pid: Option<u32>,
}

pub fn bind_label(ip: &str) -> &str {
    if ip == "0.0.0.0" {
        "All interfaces"
    } else if ip == "127.0.0.1" {
        "Localhost only"
    } else if ip.starts_with("::") {
        "IPv6"
    } else {
        ip
    }
}

fn process_label(socket: &SocketRecord, names: &HashMap<u32, String>) -> String {
    match socket.pid {
        None => "Unknown".to_string(),
        Some(pid) => names
            .get(&pid)
            .cloned()
            .or_else(|| socket.process.clone())
            .unwrap_or_else(|| "Access denied".to_string()),
    }
}

/// Listening sockets, one per (address, port), sorted by port.
pub fn listeners(sockets: &[SocketRecord], names: &HashMap<u32, String>) -> Vec<Listener> {
    let mut seen: Vec<(String, u16)> = Vec::new();
    let mut listeners = Vec::new();

    for socket in sockets.iter().filter(|s| s.state == SocketState::Listen) {
        let key = (socket.local_ip.clone(), socket.local_port);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        listeners.push(Listener {
            port: socket.local_port,
            protocol: socket.protocol.label(),
            ip: socket.local_ip.clone(),
            process: process_label(socket, names),
            pid: socket.pid,
        });
    }

    listeners.sort_by(|a, b| a.port.cmp(&b.port).then_with(|| a.ip.cmp(&b.ip)));
    listeners
}

/// Remote hosts of established TCP connections, busiest first.
pub fn remote_hosts(sockets: &[SocketRecord]) -> (usize, Vec<(String, usize)>) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total = 0;
    let established = sockets
        .iter()
        .filter(|s| s.protocol == Protocol::Tcp && s.state == SocketState::Established);
    for socket in established {
        if let Some((ip, _)) = &socket.remote {
            total += 1;
            *counts.entry(ip.clone()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    (total, ranked)
}

pub fn render(sockets: &[SocketRecord], names: &HashMap<u32, String>) -> Vec<String> {
    let mut section = Section::new(HEADING);
    let listening = listeners(sockets, names);
    let (established, hosts) = remote_hosts(sockets);

    if !listening.is_empty() {
        section
            .subheading("Listening Ports")
            .table(&["Port", "Protocol", "Bind Address", "Process", "PID"]);
        for l in &listening {
            section.row(&[
                l.port.to_string(),
                l.protocol.to_string(),
                bind_label(&l.ip).to_string(),
                truncate(&l.process, PROCESS_WIDTH),
                l.pid.map(|p| p.to_string()).unwrap_or_else(|| "N/A".to_string()),
            ]);
        }
    }

    if established > 0 {
        section
            .subheading("Active Connections")
            .line(format!("**Total established connections**: {}", established))
            .line("\n**Top remote hosts by connection count**:");
        for (host, count) in hosts.iter().take(TOP_REMOTE_HOSTS) {
            let plural = if *count > 1 { "s" } else { "" };
            section.line(format!("- {}: {} connection{}", host, count, plural));
        }
    }

    section.line(format!(
        "\n**Summary**: {} listening ports, {} active connections",
        listening.len(),
        established
    ));
    section.into_lines()
}

// ── Socket sources ──────────────────────────────────────

async fn own_process_sockets(host: &Host) -> Option<Vec<SocketRecord>> {
    let pid = std::process::id().to_string();
    host.run("lsof", &["-nP", "-a", "-i", "-p", &pid])
        .await
        .map(|out| lsof::sockets(&out))
}

/// Walk the sources from system-wide with owners down to this process
/// only, stopping at the first one that answers.
pub async fn sockets(host: &Host) -> Option<Vec<SocketRecord>> {
    match host.os() {
        Os::Linux => {
            if let Some(out) = host.run("ss", &["-Htanup"]).await {
                return Some(ss::sockets(&out));
            }
            debug!("ss with owners unavailable, retrying without");
            if let Some(out) = host.run("ss", &["-Htanu"]).await {
                return Some(ss::sockets(&out));
            }
            own_process_sockets(host).await
        }
        Os::MacOS => {
            if let Some(out) = host.run("lsof", &["-nP", "-iTCP", "-iUDP"]).await {
                return Some(lsof::sockets(&out));
            }
            debug!("lsof unavailable, falling back to netstat");
            if let Some(out) = host.run("netstat", &["-an"]).await {
                return Some(netstat::bsd_sockets(&out));
            }
            own_process_sockets(host).await
        }
        Os::Windows => {
            if let Some(out) = host.run("netstat", &["-ano"]).await {
                return Some(netstat::windows_sockets(&out));
            }
            host.run("netstat", &["-an"])
                .await
                .map(|out| netstat::windows_sockets(&out))
        }
        Os::Unsupported => None,
    }
}

fn process_names() -> HashMap<u32, String> {
    let mut sys = System::new();
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::nothing());
    sys.processes()
        .iter()
        .map(|(pid, p)| (pid.as_u32(), p.name().to_string_lossy().to_string()))
        .collect()
}

pub async fn collect(host: &Host) -> Result<Vec<String>, CollectError> {
    let Some(sockets) = sockets(host).await else {
        let mut section = Section::new(HEADING);
        section.line(warning_line(
            "Error collecting network port information",
            "no socket listing available",
        ));
        return Ok(section.into_lines());
    };

    let names = if sockets.iter().any(|s| s.pid.is_some()) {
        tokio::task::spawn_blocking(process_names).await?
    } else {
        HashMap::new()
    };
    Ok(render(&sockets, &names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fake::FakeProbe;

    fn listen(ip: &str, port: u16, pid: Option<u32>) -> SocketRecord {
        SocketRecord {
            protocol: Protocol::Tcp,
            local_ip: ip.to_string(),
            local_port: port,
            remote: None,
            state: SocketState::Listen,
            pid,
            process: None,
        }
    }

    fn established(remote: &str) -> SocketRecord {
        SocketRecord {
            protocol: Protocol::Tcp,
            local_ip: "10.0.0.2".to_string(),
            local_port: 50_000,
            remote: Some((remote.to_string(), 443)),
            state: SocketState::Established,
            pid: None,
            process: None,
        }
    }

    #[test]
    fn duplicate_bindings_collapse_to_one_row() {
        let names = HashMap::from([(1042, "sshd".to_string())]);
        let sockets = vec![
            listen("0.0.0.0", 22, Some(1042)),
            listen("0.0.0.0", 22, Some(1042)),
            listen("::", 22, Some(1042)),
        ];
        let rows = listeners(&sockets, &names);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].process, "sshd");
    }

    #[test]
    fn process_labels() {
        let names = HashMap::from([(10, "nginx".to_string())]);
        let mut hidden = listen("0.0.0.0", 443, Some(99));
        assert_eq!(process_label(&listen("0.0.0.0", 80, None), &names), "Unknown");
        assert_eq!(process_label(&listen("0.0.0.0", 80, Some(10)), &names), "nginx");
        assert_eq!(process_label(&hidden, &names), "Access denied");
        hidden.process = Some("containerd".into());
        assert_eq!(process_label(&hidden, &names), "containerd");
    }

    #[test]
    fn connected_udp_is_not_an_established_connection() {
        let mut quic = established("142.250.74.46");
        quic.protocol = Protocol::Udp;
        let (total, hosts) = remote_hosts(&[quic, established("1.1.1.1")]);
        assert_eq!(total, 1);
        assert_eq!(hosts, vec![("1.1.1.1".to_string(), 1)]);
    }

    #[tokio::test]
    async fn ss_udp_estab_rows_are_left_out_of_the_count() {
        let host = FakeProbe::new()
            .command(
                "ss -Htanup",
                concat!(
                    "udp   ESTAB  0      0       192.168.1.42:41234  142.250.74.46:443  users:((\"chrome\",pid=2001,fd=40))\n",
                    "tcp   ESTAB  0      0       192.168.1.42:51234  140.82.112.3:443  users:((\"git\",pid=2345,fd=3))\n",
                ),
            )
            .into_host(Os::Linux);
        let lines = collect(&host).await.unwrap();
        assert!(lines.contains(&"**Total established connections**: 1".to_string()));
        assert!(lines.contains(&"- 140.82.112.3: 1 connection".to_string()));
        assert!(lines.iter().all(|l| !l.contains("142.250.74.46")));
    }

    #[test]
    fn bind_labels() {
        assert_eq!(bind_label("0.0.0.0"), "All interfaces");
        assert_eq!(bind_label("127.0.0.1"), "Localhost only");
        assert_eq!(bind_label("::"), "IPv6");
        assert_eq!(bind_label("::1"), "IPv6");
        assert_eq!(bind_label("192.168.1.5"), "192.168.1.5");
    }

    #[test]
    fn renders_tables_and_summary() {
        let sockets = vec![
            listen("127.0.0.1", 5432, None),
            listen("0.0.0.0", 22, None),
            established("140.82.112.3"),
            established("140.82.112.3"),
            established("1.1.1.1"),
        ];
        assert_eq!(
            render(&sockets, &HashMap::new()),
            vec![
                "## 🌐 Network Ports",
                "\n### Listening Ports",
                "| Port | Protocol | Bind Address | Process | PID |",
                "|------|----------|--------------|---------|-----|",
                "| 22 | TCP | All interfaces | Unknown | N/A |",
                "| 5432 | TCP | Localhost only | Unknown | N/A |",
                "\n### Active Connections",
                "**Total established connections**: 3",
                "\n**Top remote hosts by connection count**:",
                "- 140.82.112.3: 2 connections",
                "- 1.1.1.1: 1 connection",
                "\n**Summary**: 2 listening ports, 3 active connections",
            ]
        );
    }

    #[tokio::test]
    async fn falls_through_to_ss_without_owners() {
        let host = FakeProbe::new()
            .command(
                "ss -Htanu",
                "tcp   LISTEN 0      128   0.0.0.0:8080   0.0.0.0:*\n",
            )
            .into_host(Os::Linux);
        let lines = collect(&host).await.unwrap();
        assert!(lines.contains(&"| 8080 | TCP | All interfaces | Unknown | N/A |".to_string()));
    }

    #[tokio::test]
    async fn every_source_missing_is_reported_inline() {
        let host = FakeProbe::new().into_host(Os::MacOS);
        let lines = collect(&host).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("⚠️ **Error collecting network port information**"));
    }

    #[tokio::test]
    async fn windows_netstat_tier() {
        let host = FakeProbe::new()
            .command(
                "netstat -ano",
                "  TCP    0.0.0.0:3389    0.0.0.0:0    LISTENING    4294967\n",
            )
            .into_host(Os::Windows);
        let lines = collect(&host).await.unwrap();
        let row = lines.iter().find(|l| l.starts_with("| 3389 |")).unwrap();
        assert!(row.ends_with("| 4294967 |"));
    }
}
