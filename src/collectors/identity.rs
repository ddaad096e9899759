use sysinfo::{CpuRefreshKind, RefreshKind, System};

use crate::error::CollectError;
use crate::parse::system_profiler;
use crate::platform::Os;
use crate::probe::Host;
use crate::report::Section;

pub const HEADING: &str = "🖥️ System Identity";

#[derive(Debug, Clone)]
pub struct OsFacts {
    pub hostname: String,
    pub os_name: String,
    pub kernel: String,
    pub os_version: String,
    pub arch: String,
    pub processor: String,
}

fn gethostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| System::host_name().unwrap_or_else(|| "unknown".into()))
}

fn read_os_facts(arch: &'static str) -> OsFacts {
    let sys = System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()));
    let processor = sys
        .cpus()
        .first()
        .map(|c| c.brand().trim().to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| arch.to_string());

    OsFacts {
        hostname: gethostname(),
        os_name: System::name().unwrap_or_else(|| "Unknown".into()),
        kernel: System::kernel_version().unwrap_or_default(),
        os_version: System::long_os_version().unwrap_or_else(|| "Unknown".into()),
        arch: arch.to_string(),
        processor,
    }
}

async fn serial_number(host: &Host) -> Option<String> {
    match host.os() {
        Os::MacOS => host
            .run("system_profiler", &["SPHardwareDataType"])
            .await
            .and_then(|out| system_profiler::hardware_serial(&out)),
        Os::Linux => host.read_attr("/sys/class/dmi/id/product_serial").await,
        Os::Windows => host
            .powershell("(Get-CimInstance Win32_BIOS).SerialNumber")
            .await
            .map(|s| s.trim().to_string()),
        Os::Unsupported => None,
    }
    .filter(|s| !s.is_empty())
}

pub fn render(facts: &OsFacts, serial: Option<&str>, wsl: bool) -> Vec<String> {
    let mut section = Section::new(HEADING);
    let platform = format!("{} {}", facts.os_name, facts.kernel);
    let platform = if wsl {
        format!("{} (WSL)", platform.trim())
    } else {
        platform.trim().to_string()
    };

    section
        .field("Hostname", &facts.hostname)
        .field("Platform", platform)
        .field("OS Version", &facts.os_version)
        .field("Architecture", &facts.arch)
        .field("Processor", &facts.processor);
    if let Some(serial) = serial {
        section.field("Serial Number", serial);
    }
    section.into_lines()
}

pub async fn collect(host: &Host) -> Result<Vec<String>, CollectError> {
    let arch = host.platform.arch;
    let facts = tokio::task::spawn_blocking(move || read_os_facts(arch)).await?;
    let serial = serial_number(host).await;
    Ok(render(&facts, serial.as_deref(), host.platform.is_wsl))
}
