//! Tool catalogue and report assembly.
//!
//! Each [`ToolName`] maps to one assembler that runs its collectors in a
//! fixed order under a title and timestamp. A collector fault ends the
//! report early with a single warning line; whatever was already collected
//! stays in the output.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tracing::{info, warn};

use crate::collectors::{
    devices, display, hardware, identity, locale, network, ports, processes, storage, user,
};
use crate::error::CollectError;
use crate::probe::Host;
use crate::report::{warning_line, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    SystemSummary,
    HardwareDetails,
    NetworkStatus,
    StorageAnalysis,
    ConnectedDevices,
    UserEnvironment,
    RunningProcesses,
    OpenPorts,
    DisplayInfo,
    FullSystemReport,
}

impl ToolName {
    pub const ALL: [ToolName; 10] = [
        ToolName::SystemSummary,
        ToolName::HardwareDetails,
        ToolName::NetworkStatus,
        ToolName::StorageAnalysis,
        ToolName::ConnectedDevices,
        ToolName::UserEnvironment,
        ToolName::RunningProcesses,
        ToolName::OpenPorts,
        ToolName::DisplayInfo,
        ToolName::FullSystemReport,
    ];

    /// Protocol-facing name.
    pub fn name(self) -> &'static str {
        match self {
            ToolName::SystemSummary => "get_system_summary",
            ToolName::HardwareDetails => "get_hardware_details",
            ToolName::NetworkStatus => "get_network_status",
            ToolName::StorageAnalysis => "get_storage_analysis",
            ToolName::ConnectedDevices => "get_connected_devices",
            ToolName::UserEnvironment => "get_user_environment",
            ToolName::RunningProcesses => "get_running_processes",
            ToolName::OpenPorts => "get_open_ports",
            ToolName::DisplayInfo => "get_display_info",
            ToolName::FullSystemReport => "get_full_system_report",
        }
    }

    /// Short name accepted by the CLI and the REST routes.
    pub fn alias(self) -> &'static str {
        match self {
            ToolName::SystemSummary => "summary",
            ToolName::HardwareDetails => "hardware-details",
            ToolName::NetworkStatus => "network-status",
            ToolName::StorageAnalysis => "storage-analysis",
            ToolName::ConnectedDevices => "connected-devices",
            ToolName::UserEnvironment => "user-environment",
            ToolName::RunningProcesses => "running-processes",
            ToolName::OpenPorts => "open-ports",
            ToolName::DisplayInfo => "display-info",
            ToolName::FullSystemReport => "full-report",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ToolName::SystemSummary => "System Summary",
            ToolName::HardwareDetails => "Hardware Details",
            ToolName::NetworkStatus => "Network Status",
            ToolName::StorageAnalysis => "Storage Analysis",
            ToolName::ConnectedDevices => "Connected Devices",
            ToolName::UserEnvironment => "User Environment",
            ToolName::RunningProcesses => "Running Processes",
            ToolName::OpenPorts => "Open Network Ports",
            ToolName::DisplayInfo => "Display Information",
            ToolName::FullSystemReport => "Complete System Report",
        }
    }

    fn error_label(self) -> &'static str {
        match self {
            ToolName::SystemSummary => "Error",
            ToolName::HardwareDetails => "Hardware detection error",
            ToolName::NetworkStatus => "Network detection error",
            ToolName::StorageAnalysis => "Storage detection error",
            ToolName::ConnectedDevices => "Device detection error",
            ToolName::UserEnvironment => "Environment detection error",
            ToolName::RunningProcesses => "Process detection error",
            ToolName::OpenPorts => "Port detection error",
            ToolName::DisplayInfo => "Display detection error",
            ToolName::FullSystemReport => "Error collecting system info",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolName::SystemSummary => {
                "Essential system overview: hostname, OS, CPU, RAM and uptime. Quick identity check without heavy data collection."
            }
            ToolName::HardwareDetails => {
                "Hardware information: CPU topology and usage, memory, swap, graphics cards and battery state."
            }
            ToolName::NetworkStatus => {
                "Network configuration and connectivity: interfaces, addresses, gateway, DNS servers, external IP and VPN status."
            }
            ToolName::StorageAnalysis => {
                "Storage usage per mounted partition: filesystem type, capacity, free and used space."
            }
            ToolName::ConnectedDevices => {
                "Peripherals attached to the machine: USB devices and paired Bluetooth devices."
            }
            ToolName::UserEnvironment => {
                "User and session details plus time, timezone and locale settings."
            }
            ToolName::RunningProcesses => {
                "Top processes by CPU and memory usage with executable paths."
            }
            ToolName::OpenPorts => {
                "Listening ports with their owning processes, and a summary of established connections."
            }
            ToolName::DisplayInfo => {
                "Connected monitors: resolution, refresh rate, color depth, connection type, HDR and primary flag."
            }
            ToolName::FullSystemReport => {
                "Complete system report combining every section. Slowest tool; use for full diagnostics."
            }
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTool(pub String);

impl fmt::Display for UnknownTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tool: {}", self.0)
    }
}

impl std::error::Error for UnknownTool {}

impl FromStr for ToolName {
    type Err = UnknownTool;

    /// Accepts the protocol name or the short alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|t| t.name() == s || t.alias() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

/// One section source. Tools list theirs in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collector {
    Identity,
    Hardware,
    HardwareSummary,
    Display,
    Network,
    Storage,
    Devices,
    Processes,
    Ports,
    User,
    Locale,
}

impl Collector {
    pub async fn collect(self, host: &Host) -> Result<Vec<String>, CollectError> {
        match self {
            Collector::Identity => identity::collect(host).await,
            Collector::Hardware => hardware::collect(host).await,
            Collector::HardwareSummary => hardware::collect_summary(host).await,
            Collector::Display => display::collect(host).await,
            Collector::Network => network::collect(host).await,
            Collector::Storage => storage::collect(host).await,
            Collector::Devices => devices::collect(host).await,
            Collector::Processes => processes::collect(host).await,
            Collector::Ports => ports::collect(host).await,
            Collector::User => user::collect(host).await,
            Collector::Locale => locale::collect(host).await,
        }
    }
}

impl ToolName {
    pub fn collectors(self) -> &'static [Collector] {
        use Collector::*;
        match self {
            ToolName::SystemSummary => &[Identity, HardwareSummary],
            ToolName::HardwareDetails => &[Hardware],
            ToolName::NetworkStatus => &[Network],
            ToolName::StorageAnalysis => &[Storage],
            ToolName::ConnectedDevices => &[Devices],
            ToolName::UserEnvironment => &[User, Locale],
            ToolName::RunningProcesses => &[Processes],
            ToolName::OpenPorts => &[Ports],
            ToolName::DisplayInfo => &[Display],
            ToolName::FullSystemReport => &[
                Identity, Hardware, Display, Network, Storage, Devices, Processes, Ports, User,
                Locale,
            ],
        }
    }
}

/// Run `tool`'s collectors in order through `collect`, stopping at the
/// first fault.
async fn assemble<F, Fut>(tool: ToolName, mut collect: F) -> String
where
    F: FnMut(Collector) -> Fut,
    Fut: Future<Output = Result<Vec<String>, CollectError>>,
{
    let started = std::time::Instant::now();
    let mut report = Report::new(tool.title());

    let mut outcome = Ok(());
    for &collector in tool.collectors() {
        match collect(collector).await {
            Ok(lines) => report.extend(lines),
            Err(e) => {
                warn!(tool = %tool, collector = ?collector, error = %e, "collector fault");
                outcome = Err(e);
                break;
            }
        }
    }

    if tool == ToolName::FullSystemReport {
        // The full report sets its warning apart and always closes with
        // the footer.
        if let Err(e) = outcome {
            report.push(format!("\n{}", warning_line(tool.error_label(), e)));
        }
        report.push("\n---");
        report.push("*Complete system analysis finished*");
    } else {
        report.settle(outcome, tool.error_label());
    }

    info!(
        tool = %tool,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "report generated"
    );
    report.render()
}

/// Build the report for `tool`. Never fails: collector faults are rendered
/// into the text.
pub async fn run(tool: ToolName, host: &Host) -> String {
    assemble(tool, |collector| collector.collect(host)).await
}

/// Dispatch by name or alias.
pub async fn dispatch(name: &str, host: &Host) -> Result<String, UnknownTool> {
    let tool: ToolName = name.parse()?;
    Ok(run(tool, host).await)
}
