//! `netstat -an` (BSD/macOS) and `netstat -ano` (Windows).

use super::{split_endpoint, Protocol, SocketRecord, SocketState};

fn protocol(token: &str) -> Option<Protocol> {
    let lower = token.to_ascii_lowercase();
    if lower.starts_with("tcp") {
        Some(Protocol::Tcp)
    } else if lower.starts_with("udp") {
        Some(Protocol::Udp)
    } else {
        None
    }
}

fn state(protocol: Protocol, token: Option<&str>, has_remote: bool) -> SocketState {
    match token {
        Some("LISTEN") | Some("LISTENING") => SocketState::Listen,
        Some("ESTABLISHED") => SocketState::Established,
        Some(_) => SocketState::Other,
        None if protocol == Protocol::Udp && !has_remote => SocketState::Listen,
        None => SocketState::Other,
    }
}

/// Wildcard peers (`*.*`, `0.0.0.0:0`, `[::]:0`) mean no remote end.
fn peer(endpoint: &str, dot_port: bool) -> Option<(String, u16)> {
    split_endpoint(endpoint, dot_port).filter(|(_, port)| *port != 0)
}

/// BSD layout: `tcp4 0 0 127.0.0.1.631 *.* LISTEN`; no owning process.
pub fn bsd_sockets(text: &str) -> Vec<SocketRecord> {
    text.lines()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let protocol = protocol(tokens.first()?)?;
            let (local_ip, local_port) = split_endpoint(tokens.get(3)?, true)?;
            let remote = tokens.get(4).and_then(|r| peer(r, true));
            let state = state(protocol, tokens.get(5).copied(), remote.is_some());

            Some(SocketRecord {
                protocol,
                local_ip,
                local_port,
                remote,
                state,
                pid: None,
                process: None,
            })
        })
        .collect()
}

/// Windows layout: `TCP 0.0.0.0:135 0.0.0.0:0 LISTENING 1040`; UDP rows
/// have no state column. The PID column only exists with `-o`.
pub fn windows_sockets(text: &str) -> Vec<SocketRecord> {
    text.lines()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let protocol = protocol(tokens.first()?)?;
            let (local_ip, local_port) = split_endpoint(tokens.get(1)?, false)?;
            let remote = tokens.get(2).and_then(|r| peer(r, false));

            let rest = &tokens[3.min(tokens.len())..];
            let (state_token, pid) = match rest {
                [s, p] => (Some(*s), p.parse().ok()),
                [one] => match one.parse::<u32>() {
                    Ok(pid) => (None, Some(pid)),
                    Err(_) => (Some(*one), None),
                },
                _ => (None, None),
            };

            Some(SocketRecord {
                protocol,
                local_ip,
                local_port,
                remote: remote.clone(),
                state: state(protocol, state_token, remote.is_some()),
                pid,
                process: None,
            })
        })
        .collect()
}
