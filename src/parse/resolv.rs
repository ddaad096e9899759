//! DNS resolver configuration: `/etc/resolv.conf` and `scutil --dns`.

/// `nameserver` entries from resolv.conf, in file order.
pub fn nameservers(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.starts_with('#') {
                return None;
            }
            line.strip_prefix("nameserver")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.split_whitespace().next().unwrap_or(s).to_string())
        })
        .collect()
}

/// `nameserver[0] : 1.1.1.1` lines from `scutil --dns`, deduplicated in
/// first-seen order.
pub fn scutil_nameservers(text: &str) -> Vec<String> {
    let mut servers: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim) {
        if !line.starts_with("nameserver[") {
            continue;
        }
        if let Some((_, addr)) = line.split_once(" : ") {
            let addr = addr.trim().to_string();
            if !addr.is_empty() && !servers.contains(&addr) {
                servers.push(addr);
            }
        }
    }
    servers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolv_conf_nameservers() {
        let content = "# Generated by NetworkManager\nsearch lan\nnameserver 192.168.1.1\n#nameserver 9.9.9.9\nnameserver 1.1.1.1\noptions edns0\n";
        assert_eq!(nameservers(content), vec!["192.168.1.1", "1.1.1.1"]);
        assert!(nameservers("").is_empty());
    }

    #[test]
    fn scutil_dedupes_across_resolvers() {
        let text = "DNS configuration\n\nresolver #1\n  nameserver[0] : 192.168.1.1\n  nameserver[1] : fd00::1\n  flags    : Request A records\n\nresolver #2\n  nameserver[0] : 192.168.1.1\n";
        assert_eq!(scutil_nameservers(text), vec!["192.168.1.1", "fd00::1"]);
    }
}
