use chrono::{NaiveDate, NaiveTime};

pub const TIME_PLACEHOLDER: &str = "-";

/// Render a check-in time as a 12-hour clock, e.g. `"14:05"` -> `"02.05pm"`.
///
/// Accepts `HH:mm`, `HH:mm AM/PM` and full timestamps (`2024-06-02T08:15:00.000Z`,
/// where the written clock part is used as-is). Anything empty, unparseable or
/// out of range renders as `"-"`.
pub fn format_time(raw: &str) -> String {
    parse_clock(raw)
        .map(|t| t.format("%I.%M%P").to_string())
        .unwrap_or_else(|| TIME_PLACEHOLDER.to_string())
}

/// Extract the clock time from one of the accepted input forms.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let s = strip_date_prefix(raw.trim());
    if s.is_empty() {
        return None;
    }

    let (hour, rest) = s.split_once(':')?;
    let hour = digits(hour.trim(), 2)?;

    let minute_len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if minute_len == 0 || minute_len > 2 {
        return None;
    }
    let (minute, tail) = rest.split_at(minute_len);
    let minute = digits(minute, 2)?;
    if hour > 23 || minute > 59 {
        return None;
    }

    let tail = tail.trim().to_ascii_lowercase();
    let hour = if tail.ends_with("pm") && hour < 12 {
        hour + 12
    } else if tail.ends_with("am") && hour == 12 {
        0
    } else {
        hour
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn strip_date_prefix(s: &str) -> &str {
    if s.len() > 10 && s.is_char_boundary(10) && NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d").is_ok() {
        let rest = &s[10..];
        if let Some(clock) = rest.strip_prefix('T').or_else(|| rest.strip_prefix(' ')) {
            return clock;
        }
    }
    s
}

fn digits(s: &str, max_len: usize) -> Option<u32> {
    if s.is_empty() || s.len() > max_len || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
