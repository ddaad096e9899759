use std::cmp::Ordering;

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, MINIMUM_CPU_UPDATE_INTERVAL};

use super::percent;
use crate::error::CollectError;
use crate::parse::{ellipsize_front, truncate};
use crate::probe::Host;
use crate::report::{warning_line, Section};

pub const HEADING: &str = "⚙️ Running Processes";

const MAX_ROWS: usize = 20;
const NAME_WIDTH: usize = 20;
const PATH_WIDTH: usize = 40;
const PATH_TAIL: usize = 37;

/// Always listed regardless of activity.
const CORE_PROCESSES: &[&str] = &["kernel_task", "systemd", "init", "launchd", "system"];

#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_percent: f64,
    pub path: Option<String>,
}

impl ProcessRecord {
    fn is_notable(&self) -> bool {
        self.cpu_percent > 0.1
            || self.memory_percent > 0.5
            || CORE_PROCESSES.contains(&self.name.to_lowercase().as_str())
    }
}

fn snapshot() -> Vec<ProcessRecord> {
    let refresh = ProcessRefreshKind::nothing()
        .with_cpu()
        .with_memory()
        .with_exe(UpdateKind::OnlyIfNotSet)
        .with_cmd(UpdateKind::OnlyIfNotSet);

    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);

    let total_memory = sys.total_memory() as f64;
    sys.processes()
        .iter()
        .filter_map(|(pid, process)| {
            let name = process.name().to_string_lossy().to_string();
            if name.is_empty() {
                return None;
            }
            let path = process
                .exe()
                .map(|p| p.to_string_lossy().to_string())
                .filter(|p| !p.is_empty())
                .or_else(|| {
                    process
                        .cmd()
                        .first()
                        .map(|arg| arg.to_string_lossy().to_string())
                        .filter(|a| !a.is_empty())
                });
            Some(ProcessRecord {
                pid: pid.as_u32(),
                name,
                cpu_percent: process.cpu_usage(),
                memory_percent: percent(process.memory() as f64, total_memory),
                path,
            })
        })
        .collect()
}

pub fn render(mut processes: Vec<ProcessRecord>) -> Vec<String> {
    let mut section = Section::new(HEADING);

    processes.sort_by(|a, b| {
        b.cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(Ordering::Equal)
            .then(
                b.memory_percent
                    .partial_cmp(&a.memory_percent)
                    .unwrap_or(Ordering::Equal),
            )
    });

    section
        .subheading("Top Processes (by CPU/Memory usage)")
        .table(&["PID", "Name", "CPU%", "Memory%", "Path"]);

    for p in processes.iter().filter(|p| p.is_notable()).take(MAX_ROWS) {
        let path = p
            .path
            .as_deref()
            .map(|path| ellipsize_front(path, PATH_WIDTH, PATH_TAIL))
            .unwrap_or_else(|| "N/A".to_string());
        section.row(&[
            p.pid.to_string(),
            truncate(&p.name, NAME_WIDTH),
            format!("{:.1}%", p.cpu_percent),
            format!("{:.1}%", p.memory_percent),
            path,
        ]);
    }

    let active = processes.iter().filter(|p| p.cpu_percent > 0.0).count();
    section.line(format!(
        "\n**Summary**: {} total processes, {} active",
        processes.len(),
        active
    ));
    section.into_lines()
}

pub async fn collect(_host: &Host) -> Result<Vec<String>, CollectError> {
    let processes = match tokio::task::spawn_blocking(snapshot).await {
        Ok(p) if !p.is_empty() => p,
        Ok(_) => {
            let mut section = Section::new(HEADING);
            section.line(warning_line(
                "Error collecting process information",
                "process table unavailable",
            ));
            return Ok(section.into_lines());
        }
        Err(e) => {
            let mut section = Section::new(HEADING);
            section.line(warning_line("Error collecting process information", e));
            return Ok(section.into_lines());
        }
    };
    Ok(render(processes))
}
