use std::fmt;

/// Host operating system family, resolved once at startup.
///
/// Every collector matches on this to pick its macOS, Linux, or Windows
/// probe; `Unsupported` hosts get the sysinfo-backed fields only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    MacOS,
    Linux,
    Windows,
    Unsupported,
}

impl Os {
    pub fn from_target(os: &str) -> Self {
        match os {
            "macos" => Os::MacOS,
            "linux" => Os::Linux,
            "windows" => Os::Windows,
            _ => Os::Unsupported,
        }
    }

    pub fn is_unix(self) -> bool {
        matches!(self, Os::MacOS | Os::Linux)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::MacOS => write!(f, "macos"),
            Os::Linux => write!(f, "linux"),
            Os::Windows => write!(f, "windows"),
            Os::Unsupported => write!(f, "unsupported"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Platform {
    pub os: Os,
    pub arch: &'static str,
    pub is_wsl: bool,
}

pub fn detect() -> Platform {
    let os = Os::from_target(std::env::consts::OS);
    let is_wsl = os == Os::Linux && detect_wsl();

    Platform {
        os,
        arch: std::env::consts::ARCH,
        is_wsl,
    }
}

fn detect_wsl() -> bool {
    std::fs::read_to_string("/proc/version")
        .map(|v| {
            let lower = v.to_lowercase();
            lower.contains("microsoft") || lower.contains("wsl")
        })
        .unwrap_or(false)
}
