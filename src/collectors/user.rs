use sysinfo::{get_current_pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::CollectError;
use crate::platform::Os;
use crate::probe::Host;
use crate::report::{Section, TIMESTAMP_FORMAT};

pub const HEADING: &str = "👤 User & Session";

pub fn current_user() -> Option<String> {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .filter(|u| !u.trim().is_empty())
}

#[cfg(unix)]
fn effective_uid() -> Option<u32> {
    // SAFETY: geteuid has no preconditions and cannot fail.
    Some(unsafe { libc::geteuid() })
}

#[cfg(not(unix))]
fn effective_uid() -> Option<u32> {
    None
}

/// GECOS display name for `user` (or `uid`) from passwd-format text.
pub fn gecos_name(passwd: &str, user: Option<&str>, uid: Option<u32>) -> Option<String> {
    passwd.lines().find_map(|line| {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 5 {
            return None;
        }
        let by_name = user.is_some_and(|u| fields[0] == u);
        let by_uid = uid.is_some_and(|id| fields[2].parse::<u32>().ok() == Some(id));
        if !(by_name || by_uid) {
            return None;
        }
        fields[4]
            .split(',')
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    })
}

async fn full_name(host: &Host, user: Option<&str>) -> Option<String> {
    match host.os() {
        Os::MacOS => {
            let user = user?;
            host.run("id", &["-F", user])
                .await
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty() && n != user)
        }
        Os::Linux => {
            let passwd = host.read_file("/etc/passwd").await?;
            gecos_name(&passwd, user, effective_uid())
        }
        Os::Windows => {
            let user = user?;
            host.run("net", &["user", user])
                .await
                .and_then(|out| {
                    out.lines()
                        .find(|l| l.starts_with("Full Name"))
                        .map(|l| l.trim_start_matches("Full Name").trim().to_string())
                })
                .filter(|n| !n.is_empty())
        }
        Os::Unsupported => None,
    }
}

fn session_start() -> Option<String> {
    let pid = get_current_pid().ok()?;
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing(),
    );
    let started = sys.process(pid)?.start_time();
    chrono::DateTime::from_timestamp(started as i64, 0).map(|utc| {
        utc.with_timezone(&chrono::Local)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    })
}

pub fn render(user: Option<&str>, full_name: Option<&str>, started: Option<&str>) -> Vec<String> {
    let mut section = Section::spaced(HEADING);
    section.field("Current User", user.unwrap_or("Unknown"));
    if let Some(name) = full_name {
        section.field("Full Name", name);
    }
    if let Some(started) = started {
        section.field("Session Start", started);
    }
    section.into_lines()
}

pub async fn collect(host: &Host) -> Result<Vec<String>, CollectError> {
    let user = current_user();
    let name = full_name(host, user.as_deref()).await;
    let started = tokio::task::spawn_blocking(session_start).await?;
    Ok(render(user.as_deref(), name.as_deref(), started.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fake::FakeProbe;

    const PASSWD: &str = "root:x:0:0:root:/root:/bin/bash
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
ada:x:1000:1000:Ada Lovelace,,,:/home/ada:/bin/zsh
svc:x:1001:1001::/srv:/bin/false
";

    #[test]
    fn gecos_first_field_by_name_or_uid() {
        assert_eq!(
            gecos_name(PASSWD, Some("ada"), None).as_deref(),
            Some("Ada Lovelace")
        );
        assert_eq!(
            gecos_name(PASSWD, None, Some(1000)).as_deref(),
            Some("Ada Lovelace")
        );
        assert_eq!(gecos_name(PASSWD, Some("svc"), None), None);
        assert_eq!(gecos_name(PASSWD, Some("nobody"), Some(4242)), None);
    }

    #[test]
    fn optional_fields_are_omitted() {
        assert_eq!(
            render(Some("ada"), None, None),
            vec!["\n## 👤 User & Session", "- **Current User**: ada"]
        );
        let lines = render(Some("ada"), Some("Ada Lovelace"), Some("2024-05-01 09:00:00"));
        assert_eq!(lines[2], "- **Full Name**: Ada Lovelace");
        assert_eq!(lines[3], "- **Session Start**: 2024-05-01 09:00:00");
    }

    #[tokio::test]
    async fn macos_full_name_must_differ_from_login() {
        let host = FakeProbe::new()
            .command("id -F ada", "Ada Lovelace\n")
            .command("id -F svc", "svc\n")
            .into_host(Os::MacOS);
        assert_eq!(full_name(&host, Some("ada")).await.as_deref(), Some("Ada Lovelace"));
        assert_eq!(full_name(&host, Some("svc")).await, None);
    }

    #[tokio::test]
    async fn windows_full_name_from_net_user() {
        let host = FakeProbe::new()
            .command(
                "net user ada",
                "User name                    ada\nFull Name                    Ada Lovelace\nComment\n",
            )
            .into_host(Os::Windows);
        assert_eq!(full_name(&host, Some("ada")).await.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn session_start_is_reported() {
        let host = FakeProbe::new().into_host(Os::Linux);
        let lines = collect(&host).await.unwrap();
        assert!(lines.iter().any(|l| l.starts_with("- **Session Start**: ")));
    }
}
