//! `lspci -mm` machine-readable output.

use super::GpuRecord;

const DISPLAY_CLASSES: &[&str] = &["VGA", "3D", "Display"];

/// Display controllers. Each line is quoted fields:
/// `slot "class" "vendor" "device" ...`; the device field is the name.
pub fn gpus(text: &str) -> Vec<GpuRecord> {
    text.lines()
        .filter(|line| DISPLAY_CLASSES.iter().any(|c| line.contains(c)))
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('"').collect();
            let name = parts.get(5).map(|s| s.trim()).filter(|s| !s.is_empty())?;
            Some(GpuRecord {
                name: name.to_string(),
                vram: None,
            })
        })
        .collect()
}
