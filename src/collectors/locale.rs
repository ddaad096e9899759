use chrono::Local;

use crate::error::CollectError;
use crate::platform::Os;
use crate::probe::Host;
use crate::report::{Section, TIMESTAMP_FORMAT};

pub const HEADING: &str = "🕐 Time & Locale";

const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_CTYPE", "LANG"];

/// `UTC+05:30`, `UTC-08:00`
pub fn utc_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    format!("UTC{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// Zone name from an `/etc/localtime` symlink target.
pub fn zone_from_link(target: &str) -> Option<String> {
    target
        .split_once("zoneinfo/")
        .map(|(_, zone)| zone.trim_matches('/').to_string())
        .filter(|z| !z.is_empty())
}

/// `en_US.UTF-8@euro` to (`en_US`, `UTF-8`). `C` and `POSIX` carry no
/// language.
pub fn split_locale(value: &str) -> (Option<String>, Option<String>) {
    let value = value.split('@').next().unwrap_or(value).trim();
    let (language, encoding) = match value.split_once('.') {
        Some((lang, enc)) => (lang, Some(enc)),
        None => (value, None),
    };
    let language = Some(language)
        .filter(|l| !l.is_empty() && *l != "C" && *l != "POSIX")
        .map(str::to_string);
    (language, encoding.filter(|e| !e.is_empty()).map(str::to_string))
}

fn env_locale() -> Option<String> {
    LOCALE_VARS
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .filter(|v| !v.trim().is_empty())
}

async fn timezone(host: &Host) -> Option<String> {
    if let Ok(tz) = std::env::var("TZ") {
        let tz = tz.trim_start_matches(':').trim().to_string();
        if !tz.is_empty() {
            return Some(tz);
        }
    }

    match host.os() {
        Os::Windows => host.run("tzutil", &["/g"]).await.map(|s| s.trim().to_string()),
        Os::MacOS | Os::Linux => {
            if let Some(zone) = host
                .read_link("/etc/localtime")
                .await
                .and_then(|target| zone_from_link(&target))
            {
                return Some(zone);
            }
            if let Some(zone) = host.read_attr("/etc/timezone").await {
                return Some(zone);
            }
            host.run("date", &["+%Z"]).await.map(|s| s.trim().to_string())
        }
        Os::Unsupported => None,
    }
}

async fn platform_language(host: &Host) -> Option<String> {
    match host.os() {
        Os::MacOS => host
            .run("defaults", &["read", "-g", "AppleLocale"])
            .await
            .map(|s| s.trim().to_string()),
        Os::Windows => host
            .powershell("(Get-Culture).Name")
            .await
            .map(|s| s.trim().to_string()),
        _ => None,
    }
}

pub struct TimeFacts {
    pub now: String,
    pub timezone: Option<String>,
    pub utc_offset: String,
    pub language: Option<String>,
    pub encoding: Option<String>,
}

pub fn render(facts: &TimeFacts) -> Vec<String> {
    let mut section = Section::spaced(HEADING);
    section
        .field("Current Time", &facts.now)
        .field("Timezone", facts.timezone.as_deref().unwrap_or("Unknown"))
        .field("UTC Offset", &facts.utc_offset)
        .field("System Language", facts.language.as_deref().unwrap_or("Unknown"))
        .field("Encoding", facts.encoding.as_deref().unwrap_or("Unknown"));
    section.into_lines()
}

pub async fn collect(host: &Host) -> Result<Vec<String>, CollectError> {
    let now = Local::now();
    let (mut language, encoding) = env_locale()
        .map(|v| split_locale(&v))
        .unwrap_or((None, None));
    if language.is_none() {
        language = platform_language(host).await;
    }

    let facts = TimeFacts {
        now: now.format(TIMESTAMP_FORMAT).to_string(),
        timezone: timezone(host).await,
        utc_offset: utc_offset(now.offset().local_minus_utc()),
        language,
        encoding,
    };
    Ok(render(&facts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fake::FakeProbe;

    #[test]
    fn offsets_keep_minutes() {
        assert_eq!(utc_offset(0), "UTC+00:00");
        assert_eq!(utc_offset(19_800), "UTC+05:30");
        assert_eq!(utc_offset(-8 * 3_600), "UTC-08:00");
        assert_eq!(utc_offset(-(3 * 3_600 + 30 * 60)), "UTC-03:30");
    }

    #[test]
    fn zone_names_from_links() {
        assert_eq!(
            zone_from_link("/usr/share/zoneinfo/Europe/Berlin").as_deref(),
            Some("Europe/Berlin")
        );
        assert_eq!(
            zone_from_link("/var/db/timezone/zoneinfo/America/New_York").as_deref(),
            Some("America/New_York")
        );
        assert_eq!(
            zone_from_link("../usr/share/zoneinfo/UTC").as_deref(),
            Some("UTC")
        );
        assert_eq!(zone_from_link("/etc/alternatives/localtime"), None);
    }

    #[test]
    fn locale_strings() {
        assert_eq!(
            split_locale("en_US.UTF-8"),
            (Some("en_US".into()), Some("UTF-8".into()))
        );
        assert_eq!(
            split_locale("de_DE.ISO-8859-15@euro"),
            (Some("de_DE".into()), Some("ISO-8859-15".into()))
        );
        assert_eq!(split_locale("C.UTF-8"), (None, Some("UTF-8".into())));
        assert_eq!(split_locale("fr_FR"), (Some("fr_FR".into()), None));
    }

    #[test]
    fn unknowns_are_spelled_out() {
        let facts = TimeFacts {
            now: "2024-05-01 09:00:00".into(),
            timezone: None,
            utc_offset: "UTC+00:00".into(),
            language: None,
            encoding: None,
        };
        assert_eq!(
            render(&facts),
            vec![
                "\n## 🕐 Time & Locale",
                "- **Current Time**: 2024-05-01 09:00:00",
                "- **Timezone**: Unknown",
                "- **UTC Offset**: UTC+00:00",
                "- **System Language**: Unknown",
                "- **Encoding**: Unknown",
            ]
        );
    }

    #[tokio::test]
    async fn linux_zone_from_localtime_link() {
        if std::env::var("TZ").is_ok() {
            return;
        }
        let host = FakeProbe::new()
            .link("/etc/localtime", "/usr/share/zoneinfo/Asia/Tokyo")
            .into_host(Os::Linux);
        assert_eq!(timezone(&host).await.as_deref(), Some("Asia/Tokyo"));
    }

    #[tokio::test]
    async fn windows_zone_from_tzutil() {
        if std::env::var("TZ").is_ok() {
            return;
        }
        let host = FakeProbe::new()
            .command("tzutil /g", "W. Europe Standard Time\r\n")
            .into_host(Os::Windows);
        assert_eq!(timezone(&host).await.as_deref(), Some("W. Europe Standard Time"));
    }
}
