//! iproute2 `ss -Htanu[p]` socket listing.

use super::{split_endpoint, Protocol, SocketRecord, SocketState};

/// `users:(("sshd",pid=1042,fd=3))` to `(pid, name)`.
fn owner(process: &str) -> (Option<u32>, Option<String>) {
    let name = process
        .split("((\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .map(str::to_string);
    let pid = process
        .split("pid=")
        .nth(1)
        .and_then(|rest| rest.split(|c: char| !c.is_ascii_digit()).next())
        .and_then(|p| p.parse().ok());
    (pid, name)
}

pub fn sockets(text: &str) -> Vec<SocketRecord> {
    text.lines()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let protocol = match *tokens.first()? {
                "tcp" => Protocol::Tcp,
                "udp" => Protocol::Udp,
                _ => return None,
            };
            let state = match (protocol, *tokens.get(1)?) {
                (_, "LISTEN") => SocketState::Listen,
                (Protocol::Udp, "UNCONN") => SocketState::Listen,
                (_, "ESTAB") => SocketState::Established,
                _ => SocketState::Other,
            };
            let (local_ip, local_port) = split_endpoint(tokens.get(4)?, false)?;
            let remote = tokens.get(5).and_then(|peer| split_endpoint(peer, false));
            let (pid, process) = if tokens.len() > 6 {
                owner(&tokens[6..].join(" "))
            } else {
                (None, None)
            };

            Some(SocketRecord {
                protocol,
                local_ip,
                local_port,
                remote,
                state,
                pid,
                process,
            })
        })
        .collect()
}
