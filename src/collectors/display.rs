use super::hardware::VIDEO_CONTROLLER_QUERY;
use crate::error::CollectError;
use crate::parse::{powershell, system_profiler, xrandr, DisplayRecord};
use crate::platform::Os;
use crate::probe::Host;
use crate::report::Section;

pub const HEADING: &str = "🖥️ Displays";

const MAX_DISPLAYS: usize = 8;

async fn macos_displays(host: &Host) -> Vec<DisplayRecord> {
    if let Some(json) = host.run("system_profiler", &["SPDisplaysDataType", "-json"]).await {
        if let Some(displays) = system_profiler::displays_json(&json) {
            return displays;
        }
    }
    host.run("system_profiler", &["SPDisplaysDataType"])
        .await
        .map(|text| system_profiler::displays_text(&text))
        .unwrap_or_default()
}

async fn linux_displays(host: &Host) -> Vec<DisplayRecord> {
    let Some(query) = host.run("xrandr", &["--query"]).await else {
        return Vec::new();
    };
    let mut displays = xrandr::displays(&query);

    // xrandr has no per-output depth; the root window depth applies to all.
    if !displays.is_empty() {
        if let Some(depth) = host
            .run("xdpyinfo", &[])
            .await
            .and_then(|info| xrandr::root_depth(&info))
        {
            for display in &mut displays {
                display.color_depth = Some(depth.clone());
            }
        }
    }
    displays
}

pub async fn displays(host: &Host) -> Vec<DisplayRecord> {
    match host.os() {
        Os::MacOS => macos_displays(host).await,
        Os::Linux => linux_displays(host).await,
        Os::Windows => host
            .powershell(VIDEO_CONTROLLER_QUERY)
            .await
            .map(|json| powershell::displays(&json))
            .unwrap_or_default(),
        Os::Unsupported => Vec::new(),
    }
}

pub fn render(section: &mut Section, displays: &[DisplayRecord]) {
    if displays.is_empty() {
        section.line("- *No displays detected*");
        return;
    }

    for display in displays.iter().take(MAX_DISPLAYS) {
        section.subheading(&display.name);
        if let Some(resolution) = &display.resolution {
            section.field("Resolution", resolution);
        }
        if let Some(rate) = &display.refresh_rate {
            section.field("Refresh Rate", rate);
        }
        if let Some(depth) = &display.color_depth {
            section.field("Color Depth", depth);
        }
        if let Some(connection) = &display.connection {
            section.field("Connection", connection);
        }
        if let Some(hdr) = display.hdr {
            section.field("HDR", if hdr { "Supported" } else { "Not supported" });
        }
        if display.primary {
            section.field("Primary", "Yes");
        }
    }
}

pub async fn collect(host: &Host) -> Result<Vec<String>, CollectError> {
    let mut section = Section::spaced(HEADING);
    render(&mut section, &displays(host).await);
    Ok(section.into_lines())
}
