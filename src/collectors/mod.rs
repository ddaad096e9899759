//! Per-domain collectors.
//!
//! Each collector queries the host through [`Host`](crate::probe::Host) and
//! returns the ordered lines of one report section. A source that is
//! missing or unparseable only shrinks the section; `Err` is reserved for
//! faults that leave the collector with nothing meaningful to say.

pub mod devices;
pub mod display;
pub mod hardware;
pub mod identity;
pub mod locale;
pub mod network;
pub mod ports;
pub mod processes;
pub mod storage;
pub mod user;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub(crate) fn gib(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

pub(crate) fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// `D days, H hours`
pub(crate) fn days_hours(secs: u64) -> String {
    format!("{} days, {} hours", secs / 86_400, (secs % 86_400) / 3_600)
}

/// `Hh Mm`
pub(crate) fn hours_minutes(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}
