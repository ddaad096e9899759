//! `lsof -nP -i` network file listing.

use super::{split_endpoint, Protocol, SocketRecord, SocketState};

pub fn sockets(text: &str) -> Vec<SocketRecord> {
    text.lines()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let command = tokens.first()?;
            let pid = tokens.get(1)?.parse::<u32>().ok()?;

            let proto_at = tokens.iter().position(|t| *t == "TCP" || *t == "UDP")?;
            let protocol = if tokens[proto_at] == "TCP" {
                Protocol::Tcp
            } else {
                Protocol::Udp
            };
            let name = tokens.get(proto_at + 1)?;
            let status = tokens.get(proto_at + 2).copied().unwrap_or("");

            let (local, remote) = match name.split_once("->") {
                Some((l, r)) => (l, split_endpoint(r, false)),
                None => (*name, None),
            };
            let (local_ip, local_port) = split_endpoint(local, false)?;

            let state = match (protocol, status) {
                (_, "(LISTEN)") => SocketState::Listen,
                (_, "(ESTABLISHED)") => SocketState::Established,
                (Protocol::Udp, _) if remote.is_none() => SocketState::Listen,
                (Protocol::Udp, _) => SocketState::Established,
                _ => SocketState::Other,
            };

            Some(SocketRecord {
                protocol,
                local_ip,
                local_port,
                remote,
                state,
                pid: Some(pid),
                process: Some(command.replace("\\x20", " ")),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "COMMAND     PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
rapportd    512 alice    4u  IPv4 0x5e1f3c0a2b1d4e5f      0t0  TCP *:49152 (LISTEN)
rapportd    512 alice    5u  IPv6 0x5e1f3c0a2b1d4e60      0t0  TCP [::1]:49153 (LISTEN)
Google\\x20 2345 alice   25u  IPv4 0x5e1f3c0a2b1d4e61      0t0  TCP 192.168.1.10:51234->140.82.112.3:443 (ESTABLISHED)
mDNSRespo   300 _mdnsresponder 8u IPv4 0x5e1f3c0a2b1d4e62  0t0  UDP *:5353
ssh        4000 alice    3u  IPv4 0x5e1f3c0a2b1d4e63      0t0  TCP 10.0.0.2:50000->10.0.0.1:22 (CLOSE_WAIT)
";

    #[test]
    fn parses_listeners_and_connections() {
        let socks = sockets(FIXTURE);
        assert_eq!(socks.len(), 5);

        assert_eq!(socks[0].local_ip, "0.0.0.0");
        assert_eq!(socks[0].local_port, 49152);
        assert_eq!(socks[0].pid, Some(512));
        assert_eq!(socks[0].state, SocketState::Listen);

        assert_eq!(socks[1].local_ip, "::1");

        assert_eq!(socks[2].state, SocketState::Established);
        assert_eq!(socks[2].remote, Some(("140.82.112.3".to_string(), 443)));
        assert_eq!(socks[2].process.as_deref(), Some("Google "));

        assert_eq!(socks[3].protocol, Protocol::Udp);
        assert_eq!(socks[3].state, SocketState::Listen);

        assert_eq!(socks[4].state, SocketState::Other);
    }
}
