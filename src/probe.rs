//! Best-effort access to ambient OS state.
//!
//! Every external command, file read, and HTTP lookup a collector performs
//! goes through [`Probe`]. Failures come back as `None`; callers treat that
//! as "no data", never as an error.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::platform::{Os, Platform};

#[async_trait]
pub trait Probe: Send + Sync {
    /// Run `program` with `args`; stdout on success, `None` on a missing
    /// binary, non-zero exit, or timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Option<String>;

    async fn read_file(&self, path: &str) -> Option<String>;

    /// Resolve a symlink target, used for `/etc/localtime`.
    async fn read_link(&self, path: &str) -> Option<String>;

    async fn fetch_text(&self, url: &str, timeout: Duration) -> Option<String>;
}

/// The real probe: child processes, the local filesystem, and reqwest.
pub struct SystemProbe {
    command_timeout: Duration,
    http: reqwest::Client,
}

impl SystemProbe {
    pub fn new(command_timeout: Duration) -> Self {
        Self {
            command_timeout,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Probe for SystemProbe {
    async fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.command_timeout, child).await {
            Ok(Ok(output)) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(Ok(output)) => {
                debug!(program, status = %output.status, "command exited unsuccessfully");
                None
            }
            Ok(Err(e)) => {
                debug!(program, error = %e, "command unavailable");
                None
            }
            Err(_) => {
                warn!(
                    program,
                    timeout_secs = self.command_timeout.as_secs(),
                    "command timed out"
                );
                None
            }
        }
    }

    async fn read_file(&self, path: &str) -> Option<String> {
        tokio::fs::read_to_string(path).await.ok()
    }

    async fn read_link(&self, path: &str) -> Option<String> {
        tokio::fs::read_link(path)
            .await
            .ok()
            .map(|p| p.to_string_lossy().to_string())
    }

    async fn fetch_text(&self, url: &str, timeout: Duration) -> Option<String> {
        let response = match self.http.get(url).timeout(timeout).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(url, error = %e, "HTTP lookup failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(url, status = %response.status(), "HTTP lookup rejected");
            return None;
        }

        response.text().await.ok()
    }
}

/// Everything a collector may consult: the platform resolved at startup,
/// the probe, and the per-request lookup settings.
pub struct Host {
    pub platform: Platform,
    pub external_ip_url: String,
    pub external_ip_timeout: Duration,
    probe: Box<dyn Probe>,
}

impl Host {
    pub fn new(
        platform: Platform,
        probe: Box<dyn Probe>,
        external_ip_url: impl Into<String>,
        external_ip_timeout: Duration,
    ) -> Self {
        Self {
            platform,
            external_ip_url: external_ip_url.into(),
            external_ip_timeout,
            probe,
        }
    }

    pub fn os(&self) -> Os {
        self.platform.os
    }

    pub async fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        self.probe
            .run(program, args)
            .await
            .filter(|out| !out.trim().is_empty())
    }

    /// Run a PowerShell snippet without loading the user profile.
    pub async fn powershell(&self, script: &str) -> Option<String> {
        self.run(
            "powershell",
            &["-NoProfile", "-NonInteractive", "-Command", script],
        )
        .await
    }

    pub async fn read_file(&self, path: &str) -> Option<String> {
        self.probe.read_file(path).await
    }

    /// First line of a sysfs-style attribute file, trimmed.
    pub async fn read_attr(&self, path: &str) -> Option<String> {
        self.read_file(path)
            .await
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub async fn read_link(&self, path: &str) -> Option<String> {
        self.probe.read_link(path).await
    }

    pub async fn fetch_text(&self, url: &str) -> Option<String> {
        self.probe.fetch_text(url, self.external_ip_timeout).await
    }
}
