use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

use super::{days_hours, gib, hours_minutes, percent};
use crate::error::CollectError;
use crate::parse::{lspci, pmset, powershell, system_profiler, GpuRecord};
use crate::platform::Os;
use crate::probe::Host;
use crate::report::{Section, TIMESTAMP_FORMAT};

pub const HEADING: &str = "🔧 Hardware";

const MAX_GPUS: usize = 3;

/// Fields carried into the system summary.
pub const SUMMARY_KEYS: &[&str] = &[
    "CPU Cores",
    "CPU Usage",
    "Total RAM",
    "Available RAM",
    "Boot Time",
    "Uptime",
];

pub const VIDEO_CONTROLLER_QUERY: &str = "Get-CimInstance Win32_VideoController | Select-Object Name, AdapterRAM, CurrentHorizontalResolution, CurrentVerticalResolution, CurrentRefreshRate, CurrentBitsPerPixel | ConvertTo-Json";

const BATTERY_QUERY: &str = "Get-CimInstance Win32_Battery | Select-Object EstimatedChargeRemaining, BatteryStatus, EstimatedRunTime | ConvertTo-Json";

const LINUX_BATTERY: &str = "/sys/class/power_supply/BAT0";

/// Counters read from sysinfo in one blocking pass.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub frequency_mhz: u64,
    pub cpu_usage: f32,
    pub load_average: Option<[f64; 3]>,
    pub total_memory: u64,
    pub available_memory: u64,
    pub total_swap: u64,
    pub used_swap: u64,
    pub boot_time: u64,
    pub uptime: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    pub percent: f64,
    pub plugged_in: bool,
    pub minutes: Option<u64>,
    pub details: Vec<(&'static str, String)>,
}

fn read_counters(unix: bool) -> Counters {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu_all();
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu_all();

    let load = System::load_average();
    Counters {
        physical_cores: sys.physical_core_count(),
        logical_cores: sys.cpus().len(),
        frequency_mhz: sys.cpus().first().map(|c| c.frequency()).unwrap_or(0),
        cpu_usage: sys.global_cpu_usage(),
        load_average: unix.then_some([load.one, load.five, load.fifteen]),
        total_memory: sys.total_memory(),
        available_memory: sys.available_memory(),
        total_swap: sys.total_swap(),
        used_swap: sys.used_swap(),
        boot_time: System::boot_time(),
        uptime: System::uptime(),
    }
}

pub async fn sample(host: &Host) -> Result<Counters, CollectError> {
    let unix = host.os().is_unix();
    let counters = tokio::task::spawn_blocking(move || read_counters(unix)).await?;
    if counters.total_memory == 0 {
        return Err(CollectError::Unavailable("memory counters"));
    }
    Ok(counters)
}

fn format_boot_time(boot_time: u64) -> String {
    chrono::DateTime::from_timestamp(boot_time as i64, 0)
        .map(|utc| {
            utc.with_timezone(&chrono::Local)
                .format(TIMESTAMP_FORMAT)
                .to_string()
        })
        .unwrap_or_else(|| "Unknown".to_string())
}

/// CPU and memory fields. Boot time and uptime are appended separately so
/// the GPU and battery blocks sit between them.
pub fn render_counters(section: &mut Section, c: &Counters, max_mhz: Option<u64>) {
    let physical = c
        .physical_cores
        .map(|n| n.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    section.field(
        "CPU Cores",
        format!("{} physical, {} logical", physical, c.logical_cores),
    );

    if c.frequency_mhz > 0 {
        match max_mhz {
            Some(max) => section.field(
                "CPU Frequency",
                format!("{} MHz (max: {} MHz)", c.frequency_mhz, max),
            ),
            None => section.field("CPU Frequency", format!("{} MHz", c.frequency_mhz)),
        };
    }

    section.field("CPU Usage", format!("{:.1}%", c.cpu_usage));
    if let Some([one, five, fifteen]) = c.load_average {
        section.field("Load Average", format!("{:.2}, {:.2}, {:.2}", one, five, fifteen));
    }

    let used = c.total_memory.saturating_sub(c.available_memory);
    section
        .field("Total RAM", format!("{:.1} GB", gib(c.total_memory)))
        .field(
            "Available RAM",
            format!(
                "{:.1} GB ({:.1}% used)",
                gib(c.available_memory),
                percent(used as f64, c.total_memory as f64)
            ),
        );

    if c.total_swap > 0 {
        section.field(
            "Swap",
            format!(
                "{:.1} GB ({:.1}% used)",
                gib(c.total_swap),
                percent(c.used_swap as f64, c.total_swap as f64)
            ),
        );
    }
}

pub fn render_uptime(section: &mut Section, c: &Counters) {
    section
        .spaced_field("Boot Time", format_boot_time(c.boot_time))
        .field("Uptime", days_hours(c.uptime));
}

pub fn render_gpus(section: &mut Section, gpus: &[GpuRecord]) {
    if gpus.is_empty() {
        return;
    }
    section.subheading("Graphics Cards");
    for gpu in gpus.iter().take(MAX_GPUS) {
        section.field("GPU", &gpu.name);
        if let Some(vram) = &gpu.vram {
            section.sub_field("VRAM", vram);
        }
    }
}

pub fn render_battery(section: &mut Section, battery: &Battery) {
    section
        .subheading("Battery")
        .field("Charge Level", format!("{:.1}%", battery.percent));

    if battery.plugged_in {
        section.field("Status", "Charging (plugged in)");
    } else {
        section.field("Status", "On battery");
    }
    if let Some(minutes) = battery.minutes {
        let label = if battery.plugged_in {
            "Time to Full"
        } else {
            "Time Remaining"
        };
        section.field(label, hours_minutes(minutes));
    }
    for (key, value) in &battery.details {
        section.field(key, value);
    }
}

// ── Sub-probes ──────────────────────────────────────────

async fn max_frequency(host: &Host) -> Option<u64> {
    match host.os() {
        Os::Linux => host
            .read_attr("/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq")
            .await
            .and_then(|khz| khz.parse::<u64>().ok())
            .map(|khz| khz / 1000),
        Os::MacOS => host
            .run("sysctl", &["-n", "hw.cpufrequency_max"])
            .await
            .and_then(|hz| hz.trim().parse::<u64>().ok())
            .map(|hz| hz / 1_000_000),
        Os::Windows => host
            .powershell("(Get-CimInstance Win32_Processor | Select-Object -First 1).MaxClockSpeed")
            .await
            .and_then(|mhz| mhz.trim().parse::<u64>().ok()),
        Os::Unsupported => None,
    }
    .filter(|mhz| *mhz > 0)
}

pub async fn gpus(host: &Host) -> Vec<GpuRecord> {
    match host.os() {
        Os::MacOS => {
            if let Some(json) = host.run("system_profiler", &["SPDisplaysDataType", "-json"]).await {
                if let Some(gpus) = system_profiler::gpus_json(&json) {
                    return gpus;
                }
            }
            host.run("system_profiler", &["SPDisplaysDataType"])
                .await
                .map(|text| system_profiler::gpus_text(&text))
                .unwrap_or_default()
        }
        Os::Linux => host
            .run("lspci", &["-mm"])
            .await
            .map(|text| lspci::gpus(&text))
            .unwrap_or_default(),
        Os::Windows => host
            .powershell(VIDEO_CONTROLLER_QUERY)
            .await
            .map(|json| powershell::gpus(&json))
            .unwrap_or_default(),
        Os::Unsupported => Vec::new(),
    }
}

async fn linux_battery(host: &Host) -> Option<Battery> {
    let attr = |name: &str| format!("{}/{}", LINUX_BATTERY, name);
    let number = |s: Option<String>| s.and_then(|v| v.parse::<f64>().ok());

    let percent = number(host.read_attr(&attr("capacity")).await)?;
    let status = host.read_attr(&attr("status")).await.unwrap_or_default();
    let plugged_in = status != "Discharging";

    // Energy (µWh, µW) or charge (µAh, µA) depending on the driver.
    let power_now = number(host.read_attr(&attr("power_now")).await);
    let (now, full, design, rate) = match number(host.read_attr(&attr("energy_now")).await) {
        Some(now) => (
            Some(now),
            number(host.read_attr(&attr("energy_full")).await),
            number(host.read_attr(&attr("energy_full_design")).await),
            power_now,
        ),
        None => (
            number(host.read_attr(&attr("charge_now")).await),
            number(host.read_attr(&attr("charge_full")).await),
            number(host.read_attr(&attr("charge_full_design")).await),
            number(host.read_attr(&attr("current_now")).await),
        ),
    };

    let minutes = match (now, full, rate) {
        (Some(now), _, Some(rate)) if rate > 0.0 && status == "Discharging" => {
            Some((now / rate * 60.0) as u64)
        }
        (Some(now), Some(full), Some(rate)) if rate > 0.0 && status == "Charging" => {
            Some(((full - now).max(0.0) / rate * 60.0) as u64)
        }
        _ => None,
    };

    let mut details = Vec::new();
    if let Some(watts) = power_now.filter(|p| *p > 0.0) {
        details.push(("Power Draw", format!("{:.1}W", watts / 1_000_000.0)));
    }
    if let (Some(full), Some(design)) = (full, design) {
        if design > 0.0 {
            details.push(("Battery Health", format!("{:.1}%", full / design * 100.0)));
        }
    }

    Some(Battery {
        percent,
        plugged_in,
        minutes,
        details,
    })
}

async fn macos_battery(host: &Host) -> Option<Battery> {
    let status = pmset::battery(&host.run("pmset", &["-g", "batt"]).await?)?;
    let details = host
        .run("system_profiler", &["SPPowerDataType"])
        .await
        .map(|text| system_profiler::power_details(&text))
        .unwrap_or_default();

    Some(Battery {
        percent: status.percent,
        plugged_in: status.plugged_in,
        minutes: status.minutes,
        details,
    })
}

async fn windows_battery(host: &Host) -> Option<Battery> {
    let status = powershell::battery(&host.powershell(BATTERY_QUERY).await?)?;
    Some(Battery {
        percent: status.percent,
        plugged_in: status.plugged_in,
        minutes: if status.plugged_in {
            None
        } else {
            status.minutes_remaining
        },
        details: Vec::new(),
    })
}

pub async fn battery(host: &Host) -> Option<Battery> {
    match host.os() {
        Os::Linux => linux_battery(host).await,
        Os::MacOS => macos_battery(host).await,
        Os::Windows => windows_battery(host).await,
        Os::Unsupported => None,
    }
}

pub async fn collect(host: &Host) -> Result<Vec<String>, CollectError> {
    let counters = sample(host).await?;
    let max_mhz = max_frequency(host).await;

    let mut section = Section::spaced(HEADING);
    render_counters(&mut section, &counters, max_mhz);
    render_gpus(&mut section, &gpus(host).await);
    if let Some(battery) = battery(host).await {
        render_battery(&mut section, &battery);
    }
    render_uptime(&mut section, &counters);
    Ok(section.into_lines())
}

/// CPU, memory, and uptime lines only; skips the GPU and battery probes.
/// Headline lines only: no heading, no GPU or battery probes.
pub fn summary_lines(counters: &Counters) -> Vec<String> {
    let mut section = Section::default();
    render_counters(&mut section, counters, None);
    render_uptime(&mut section, counters);

    section
        .into_lines()
        .into_iter()
        .filter(|line| {
            SUMMARY_KEYS
                .iter()
                .any(|key| line.contains(&format!("**{}**:", key)))
        })
        .collect()
}

pub async fn collect_summary(host: &Host) -> Result<Vec<String>, CollectError> {
    let counters = sample(host).await?;
    Ok(summary_lines(&counters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fake::FakeProbe;

    fn counters() -> Counters {
        Counters {
            physical_cores: Some(8),
            logical_cores: 16,
            frequency_mhz: 2400,
            cpu_usage: 12.34,
            load_average: Some([0.5, 0.75, 1.0]),
            total_memory: 32 * 1024 * 1024 * 1024,
            available_memory: 8 * 1024 * 1024 * 1024,
            total_swap: 0,
            used_swap: 0,
            boot_time: 0,
            uptime: 2 * 86_400 + 3 * 3_600,
        }
    }

    #[test]
    fn counters_render_with_fixed_precision() {
        let mut section = Section::new(HEADING);
        render_counters(&mut section, &counters(), Some(4800));
        render_uptime(&mut section, &counters());
        let lines = section.into_lines();

        assert_eq!(lines[1], "- **CPU Cores**: 8 physical, 16 logical");
        assert_eq!(lines[2], "- **CPU Frequency**: 2400 MHz (max: 4800 MHz)");
        assert_eq!(lines[3], "- **CPU Usage**: 12.3%");
        assert_eq!(lines[4], "- **Load Average**: 0.50, 0.75, 1.00");
        assert_eq!(lines[5], "- **Total RAM**: 32.0 GB");
        assert_eq!(lines[6], "- **Available RAM**: 8.0 GB (75.0% used)");
        assert!(lines[7].starts_with("\n- **Boot Time**: "));
        assert_eq!(lines[8], "- **Uptime**: 2 days, 3 hours");
    }

    #[test]
    fn summary_carries_core_counts() {
        let lines = summary_lines(&counters());
        assert_eq!(lines[0], "- **CPU Cores**: 8 physical, 16 logical");
        assert!(lines.iter().all(|l| !l.contains("CPU Frequency")));
        assert!(lines.iter().all(|l| !l.contains("Load Average")));

        let mut unknown = counters();
        unknown.physical_cores = None;
        assert!(summary_lines(&unknown)[0].starts_with("- **CPU Cores**: "));
    }

    #[test]
    fn live_sample_reads_core_counts() {
        let c = read_counters(true);
        assert!(c.logical_cores > 0);
        if let Some(physical) = c.physical_cores {
            assert!(physical <= c.logical_cores);
        }
    }

    #[test]
    fn swap_only_when_present() {
        let mut c = counters();
        c.total_swap = 4 * 1024 * 1024 * 1024;
        c.used_swap = 1024 * 1024 * 1024;
        let mut section = Section::default();
        render_counters(&mut section, &c, None);
        let lines = section.into_lines();
        assert!(lines.contains(&"- **Swap**: 4.0 GB (25.0% used)".to_string()));
        assert!(lines.contains(&"- **CPU Frequency**: 2400 MHz".to_string()));
    }

    #[test]
    fn gpu_list_is_capped() {
        let gpus: Vec<GpuRecord> = (0..5)
            .map(|i| GpuRecord {
                name: format!("GPU {}", i),
                vram: None,
            })
            .collect();
        let mut section = Section::default();
        render_gpus(&mut section, &gpus);
        let lines = section.into_lines();
        assert_eq!(lines[0], "\n### Graphics Cards");
        assert_eq!(lines.iter().filter(|l| l.starts_with("- **GPU**")).count(), 3);
    }

    #[tokio::test]
    async fn linux_battery_from_sysfs() {
        let host = FakeProbe::new()
            .file("/sys/class/power_supply/BAT0/capacity", "64\n")
            .file("/sys/class/power_supply/BAT0/status", "Discharging\n")
            .file("/sys/class/power_supply/BAT0/power_now", "9500000\n")
            .file("/sys/class/power_supply/BAT0/energy_now", "38000000\n")
            .file("/sys/class/power_supply/BAT0/energy_full", "50000000\n")
            .file("/sys/class/power_supply/BAT0/energy_full_design", "57000000\n")
            .into_host(Os::Linux);

        let battery = battery(&host).await.unwrap();
        assert_eq!(battery.percent, 64.0);
        assert!(!battery.plugged_in);
        assert_eq!(battery.minutes, Some(240));

        let mut section = Section::default();
        render_battery(&mut section, &battery);
        let lines = section.into_lines();
        assert_eq!(
            lines,
            vec![
                "\n### Battery",
                "- **Charge Level**: 64.0%",
                "- **Status**: On battery",
                "- **Time Remaining**: 4h 0m",
                "- **Power Draw**: 9.5W",
                "- **Battery Health**: 87.7%",
            ]
        );
    }

    #[tokio::test]
    async fn macos_battery_merges_power_details() {
        let host = FakeProbe::new()
            .command(
                "pmset -g batt",
                "Now drawing from 'AC Power'\n -InternalBattery-0 (id=1)\t80%; charging; 0:45 remaining present: true\n",
            )
            .command(
                "system_profiler SPPowerDataType",
                "      Cycle Count: 120\n      Condition: Normal\n      Wattage (W): 67\n",
            )
            .into_host(Os::MacOS);

        let battery = battery(&host).await.unwrap();
        assert!(battery.plugged_in);
        assert_eq!(battery.minutes, Some(45));
        assert!(battery.details.contains(&("Charging Wattage", "67W".to_string())));
    }

    #[tokio::test]
    async fn desktop_without_tools_has_no_optional_blocks() {
        let host = FakeProbe::new().into_host(Os::Linux);
        let lines = collect(&host).await.unwrap();
        assert_eq!(lines[0], "\n## 🔧 Hardware");
        assert!(lines.iter().all(|l| !l.contains("### Battery")));
        assert!(lines.iter().all(|l| !l.contains("### Graphics Cards")));
        assert!(lines.iter().any(|l| l.starts_with("- **Uptime**")));
    }

    #[tokio::test]
    async fn linux_gpus_from_lspci() {
        let host = FakeProbe::new()
            .command(
                "lspci -mm",
                "00:02.0 \"VGA compatible controller\" \"Intel Corporation\" \"UHD Graphics 620\" -r07 \"Lenovo\" \"Device 2259\"\n",
            )
            .into_host(Os::Linux);
        let gpus = gpus(&host).await;
        assert_eq!(gpus[0].name, "UHD Graphics 620");
    }

    #[tokio::test]
    async fn summary_keeps_only_key_fields() {
        let host = FakeProbe::new().into_host(Os::Linux);
        let lines = collect_summary(&host).await.unwrap();
        assert!(lines[0].starts_with("- **CPU Cores**"));
        assert!(lines.iter().all(|l| !l.contains("Load Average")));
        assert!(lines.last().unwrap().starts_with("- **Uptime**"));
    }
}
