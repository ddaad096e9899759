//! X11 display state: `xrandr --query` and `xdpyinfo`.

use super::DisplayRecord;

fn connection_type(output: &str) -> Option<String> {
    let upper = output.to_ascii_uppercase();
    let label = if upper.starts_with("EDP") || upper.starts_with("LVDS") || upper.starts_with("DSI") {
        "Internal"
    } else if upper.starts_with("HDMI") {
        "HDMI"
    } else if upper.starts_with("DP") || upper.starts_with("DISPLAYPORT") {
        "DisplayPort"
    } else if upper.starts_with("VGA") {
        "VGA"
    } else if upper.starts_with("DVI") {
        "DVI"
    } else {
        return None;
    };
    Some(label.to_string())
}

/// `1920x1080+0+0` to `1920 x 1080`.
fn geometry(token: &str) -> Option<String> {
    let size = token.split('+').next()?;
    let (w, h) = size.split_once('x')?;
    if w.parse::<u32>().is_err() || h.parse::<u32>().is_err() || !token.contains('+') {
        return None;
    }
    Some(format!("{} x {}", w, h))
}

/// Connected outputs. The active mode line carries a `*` after its rate.
pub fn displays(text: &str) -> Vec<DisplayRecord> {
    let mut displays: Vec<DisplayRecord> = Vec::new();
    let mut in_connected = false;

    for line in text.lines() {
        if line.starts_with("Screen ") {
            continue;
        }

        if !line.starts_with(' ') && !line.starts_with('\t') {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            in_connected = tokens.get(1) == Some(&"connected");
            if !in_connected {
                continue;
            }
            let name = tokens[0].to_string();
            displays.push(DisplayRecord {
                connection: connection_type(&name),
                resolution: tokens.iter().find_map(|t| geometry(t)),
                primary: tokens.contains(&"primary"),
                name,
                ..Default::default()
            });
            continue;
        }

        if !in_connected {
            continue;
        }
        let Some(display) = displays.last_mut() else {
            continue;
        };
        if display.refresh_rate.is_some() {
            continue;
        }
        if let Some(active) = line.split_whitespace().skip(1).find(|t| t.contains('*')) {
            let rate = active.trim_end_matches(['*', '+']);
            display.refresh_rate = Some(format!("{} Hz", rate));
        }
    }
    displays
}

/// `depth of root window:    24 planes` from `xdpyinfo`.
pub fn root_depth(text: &str) -> Option<String> {
    text.lines()
        .find(|l| l.contains("depth of root window"))
        .and_then(|l| l.split(':').nth(1))
        .and_then(|v| v.split_whitespace().next())
        .map(|bits| format!("{}-bit", bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "Screen 0: minimum 320 x 200, current 3840 x 1080, maximum 16384 x 16384
eDP-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 309mm x 174mm
   1920x1080     60.02*+  59.97    59.96    48.00
   1680x1050     59.95    59.88
HDMI-1 connected 1920x1080+1920+0 (normal left inverted right x axis y axis) 527mm x 296mm
   1920x1080     60.00 +  50.00*   59.94
DP-1 disconnected (normal left inverted right x axis y axis)
   1280x720      60.00
DP-2 connected (normal left inverted right x axis y axis)
   2560x1440     59.95 +
";

    #[test]
    fn connected_outputs_only() {
        let displays = displays(FIXTURE);
        let names: Vec<_> = displays.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["eDP-1", "HDMI-1", "DP-2"]);
    }

    #[test]
    fn active_mode_and_geometry() {
        let displays = displays(FIXTURE);

        let laptop = &displays[0];
        assert!(laptop.primary);
        assert_eq!(laptop.resolution.as_deref(), Some("1920 x 1080"));
        assert_eq!(laptop.refresh_rate.as_deref(), Some("60.02 Hz"));
        assert_eq!(laptop.connection.as_deref(), Some("Internal"));

        let hdmi = &displays[1];
        assert!(!hdmi.primary);
        assert_eq!(hdmi.refresh_rate.as_deref(), Some("50.00 Hz"));
        assert_eq!(hdmi.connection.as_deref(), Some("HDMI"));

        let idle = &displays[2];
        assert_eq!(idle.resolution, None);
        assert_eq!(idle.refresh_rate, None);
        assert_eq!(idle.connection.as_deref(), Some("DisplayPort"));
    }

    #[test]
    fn depth_from_xdpyinfo() {
        let text = "screen #0:\n  dimensions:    3840x1080 pixels\n  depth of root window:    24 planes\n";
        assert_eq!(root_depth(text).as_deref(), Some("24-bit"));
        assert_eq!(root_depth(""), None);
    }
}
