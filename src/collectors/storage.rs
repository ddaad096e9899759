use sysinfo::Disks;

use super::{gib, percent};
use crate::error::CollectError;
use crate::probe::Host;
use crate::report::Section;

pub const HEADING: &str = "💾 Storage";

const SKIPPED_FILESYSTEMS: &[&str] = &["tmpfs", "devtmpfs"];

#[derive(Debug, Clone)]
pub struct Partition {
    pub device: String,
    pub mount: String,
    pub file_system: String,
    pub removable: bool,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

fn list_partitions() -> Vec<Partition> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .iter()
        .map(|d| Partition {
            device: d.name().to_string_lossy().to_string(),
            mount: d.mount_point().to_string_lossy().to_string(),
            file_system: d.file_system().to_string_lossy().to_string(),
            removable: d.is_removable(),
            total_bytes: d.total_space(),
            available_bytes: d.available_space(),
        })
        .collect()
}

pub fn render(partitions: &[Partition]) -> Vec<String> {
    let mut section = Section::spaced(HEADING);

    for p in partitions {
        if SKIPPED_FILESYSTEMS.contains(&p.file_system.as_str()) || p.total_bytes == 0 {
            continue;
        }
        let free_pct = percent(p.available_bytes as f64, p.total_bytes as f64);
        let kind = if p.removable { "Removable" } else { "Fixed" };

        section
            .subheading(&format!("{} ({})", p.device, p.mount))
            .field("Type", format!("{} ({})", kind, p.file_system))
            .field("Total", format!("{:.1} GB", gib(p.total_bytes)))
            .field(
                "Free",
                format!("{:.1} GB ({:.1}% free)", gib(p.available_bytes), free_pct),
            )
            .field("Used", format!("{:.1}%", 100.0 - free_pct));
    }
    section.into_lines()
}

pub async fn collect(_host: &Host) -> Result<Vec<String>, CollectError> {
    let partitions = tokio::task::spawn_blocking(list_partitions).await?;
    Ok(render(&partitions))
}
