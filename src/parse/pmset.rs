//! `pmset -g batt` on macOS.

#[derive(Debug, Clone, PartialEq)]
pub struct BatteryStatus {
    pub percent: f64,
    pub plugged_in: bool,
    /// Minutes to full when charging, remaining when discharging.
    pub minutes: Option<u64>,
}

/// Parse the `-InternalBattery-0` line:
/// `-InternalBattery-0 (id=1234)	87%; discharging; 4:12 remaining present: true`.
pub fn battery(text: &str) -> Option<BatteryStatus> {
    let plugged_in = text.contains("AC Power");
    let line = text.lines().find(|l| l.contains("InternalBattery"))?;
    let (_, detail) = line.split_once('\t').or_else(|| line.split_once(')'))?;

    let mut fields = detail.split(';').map(str::trim);
    let percent = fields
        .next()?
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()?;
    let state = fields.next().unwrap_or("");
    let timing = fields.next().unwrap_or("");

    let plugged_in = plugged_in || state == "charging" || state == "charged" || state == "AC attached";
    let minutes = timing
        .split_whitespace()
        .next()
        .and_then(|hm| hm.split_once(':'))
        .and_then(|(h, m)| Some(h.parse::<u64>().ok()? * 60 + m.parse::<u64>().ok()?));

    Some(BatteryStatus {
        percent,
        plugged_in,
        minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discharging_with_estimate() {
        let text = "Now drawing from 'Battery Power'\n -InternalBattery-0 (id=4653155)\t87%; discharging; 4:12 remaining present: true\n";
        let status = battery(text).unwrap();
        assert_eq!(status.percent, 87.0);
        assert!(!status.plugged_in);
        assert_eq!(status.minutes, Some(252));
    }

    #[test]
    fn charging_without_estimate() {
        let text = "Now drawing from 'AC Power'\n -InternalBattery-0 (id=4653155)\t42%; charging; (no estimate) present: true\n";
        let status = battery(text).unwrap();
        assert!(status.plugged_in);
        assert_eq!(status.minutes, None);
    }

    #[test]
    fn desktop_has_no_battery() {
        assert_eq!(battery("Now drawing from 'AC Power'\n"), None);
    }
}
