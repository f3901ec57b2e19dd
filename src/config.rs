use std::fmt;
use std::time::Duration;

use chrono::FixedOffset;

use crate::clock::Clock;
use crate::models::ServiceCalendar;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Runtime configuration, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Spreadsheet-backed endpoint holding every check-in record.
    pub records_url: String,
    /// Base URL of the REST API (auth, roster, service days).
    pub api_url: String,
    pub admin_emails: Vec<String>,
    pub calendar: ServiceCalendar,
    pub utc_offset: Option<FixedOffset>,
    pub http_timeout: Duration,
    /// Background refresh of the record snapshot; `None` disables it.
    pub refresh_interval: Option<Duration>,
    pub session_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, reason } => write!(f, "{key} is invalid: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; tests pass a closure over a map.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let records_url = var("ATTENDANCE_RECORDS_URL").ok_or(ConfigError::Missing("ATTENDANCE_RECORDS_URL"))?;
        let api_url = var("ATTENDANCE_API_URL")
            .ok_or(ConfigError::Missing("ATTENDANCE_API_URL"))?
            .trim_end_matches('/')
            .to_string();

        let admin_emails = var("ATTENDANCE_ADMIN_EMAILS")
            .map(|v| {
                v.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let calendar = match var("ATTENDANCE_SERVICE_DAYS") {
            Some(v) => ServiceCalendar::parse(&v).map_err(|reason| ConfigError::Invalid {
                key: "ATTENDANCE_SERVICE_DAYS",
                reason,
            })?,
            None => ServiceCalendar::default(),
        };

        let utc_offset = match var("ATTENDANCE_UTC_OFFSET") {
            Some(v) => Some(parse_offset(&v).ok_or_else(|| ConfigError::Invalid {
                key: "ATTENDANCE_UTC_OFFSET",
                reason: format!("expected +HH:MM, got '{v}'"),
            })?),
            None => None,
        };

        let http_timeout = Duration::from_secs(parse_secs(
            var("ATTENDANCE_HTTP_TIMEOUT_SECS"),
            "ATTENDANCE_HTTP_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);

        let refresh_secs = parse_secs(var("ATTENDANCE_REFRESH_SECS"), "ATTENDANCE_REFRESH_SECS", 0)?;
        let refresh_interval = (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs));

        Ok(Config {
            bind_addr: var("ATTENDANCE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            records_url,
            api_url,
            admin_emails,
            calendar,
            utc_offset,
            http_timeout,
            refresh_interval,
            session_key: get("SESSION_KEY"),
        })
    }

    pub fn clock(&self) -> Clock {
        Clock::System { offset: self.utc_offset }
    }
}

fn parse_secs(value: Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match value {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
            key,
            reason: format!("expected whole seconds, got '{v}'"),
        }),
        None => Ok(default),
    }
}

/// `+01:00`, `-05:30`, `+0100` or `Z`.
pub fn parse_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match s.chars().next()? {
        '+' => (1, &s[1..]),
        '-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("ATTENDANCE_RECORDS_URL", "https://sheets.example/exec"),
        ("ATTENDANCE_API_URL", "https://api.example/v1/"),
    ];

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.api_url, "https://api.example/v1");
        assert_eq!(cfg.calendar, ServiceCalendar::default());
        assert_eq!(cfg.http_timeout, Duration::from_secs(15));
        assert!(cfg.refresh_interval.is_none());
        assert!(cfg.admin_emails.is_empty());
    }

    #[test]
    fn missing_urls_are_reported() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ATTENDANCE_RECORDS_URL"));
        let err = Config::from_lookup(lookup(&REQUIRED[..1])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ATTENDANCE_API_URL"));
    }

    #[test]
    fn parses_optional_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("ATTENDANCE_ADMIN_EMAILS", "Pastor@Example.com, ,clerk@example.com"),
            ("ATTENDANCE_SERVICE_DAYS", "Wednesday=6:00pm,Sunday=8:00am"),
            ("ATTENDANCE_UTC_OFFSET", "+01:00"),
            ("ATTENDANCE_REFRESH_SECS", "120"),
        ]);
        let cfg = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.admin_emails, vec!["pastor@example.com", "clerk@example.com"]);
        assert_eq!(cfg.calendar.days().len(), 2);
        assert_eq!(cfg.utc_offset, FixedOffset::east_opt(3600));
        assert_eq!(cfg.refresh_interval, Some(Duration::from_secs(120)));
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ATTENDANCE_UTC_OFFSET", "WAT"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "ATTENDANCE_UTC_OFFSET", .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ATTENDANCE_HTTP_TIMEOUT_SECS", "soon"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn offsets() {
        assert_eq!(parse_offset("-05:30"), FixedOffset::west_opt(5 * 3600 + 30 * 60));
        assert_eq!(parse_offset("+0100"), FixedOffset::east_opt(3600));
        assert_eq!(parse_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_offset("+1:00"), None);
        assert_eq!(parse_offset("01:00"), None);
    }
}
