use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// One recognized gathering day of the week and its published start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDay {
    pub weekday: Weekday,
    pub start_time: String, // display form, e.g. "5:15pm"
}

/// The set of weekdays on which attendance is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCalendar {
    days: Vec<ServiceDay>,
}

impl Default for ServiceCalendar {
    fn default() -> Self {
        Self::new(vec![
            ServiceDay { weekday: Weekday::Tue, start_time: "5:15pm".to_string() },
            ServiceDay { weekday: Weekday::Fri, start_time: "5:30pm".to_string() },
            ServiceDay { weekday: Weekday::Sun, start_time: "8:00am".to_string() },
        ])
    }
}

impl ServiceCalendar {
    pub fn new(mut days: Vec<ServiceDay>) -> Self {
        days.dedup_by(|a, b| a.weekday == b.weekday);
        Self { days }
    }

    /// Parse `Tuesday=5:15pm,Friday=5:30pm,Sunday` style lists. A day without
    /// `=time` gets an empty start time.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let mut days: Vec<ServiceDay> = Vec::new();
        for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (day, time) = match item.split_once('=') {
                Some((d, t)) => (d.trim(), t.trim()),
                None => (item, ""),
            };
            let weekday = parse_weekday(day).ok_or_else(|| format!("Unknown service day '{day}'"))?;
            if days.iter().any(|d| d.weekday == weekday) {
                return Err(format!("Service day '{day}' listed twice"));
            }
            days.push(ServiceDay { weekday, start_time: time.to_string() });
        }
        if days.is_empty() {
            return Err("At least one service day is required".to_string());
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> &[ServiceDay] {
        &self.days
    }

    pub fn is_service_weekday(&self, weekday: Weekday) -> bool {
        self.days.iter().any(|d| d.weekday == weekday)
    }

    pub fn is_service_day(&self, date: NaiveDate) -> bool {
        self.is_service_weekday(date.weekday())
    }

    /// True when `service` names a recognized day ("Sunday", "sunday", "Sun").
    pub fn recognizes(&self, service: &str) -> bool {
        parse_weekday(service).is_some_and(|wd| self.is_service_weekday(wd))
    }

    /// Published start time for a service, if configured.
    pub fn service_time(&self, service: &str) -> Option<&str> {
        let weekday = parse_weekday(service)?;
        self.days
            .iter()
            .find(|d| d.weekday == weekday)
            .map(|d| d.start_time.as_str())
            .filter(|t| !t.is_empty())
    }
}

pub fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.trim().to_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Canonical day name for a raw service value, or `None` if it is not a weekday.
pub fn canonical_service(s: &str) -> Option<&'static str> {
    parse_weekday(s).map(weekday_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_calendar_is_tuesday_friday_sunday() {
        let cal = ServiceCalendar::default();
        assert!(cal.is_service_weekday(Weekday::Tue));
        assert!(cal.is_service_weekday(Weekday::Fri));
        assert!(cal.is_service_weekday(Weekday::Sun));
        assert!(!cal.is_service_weekday(Weekday::Wed));
        assert!(!cal.is_service_weekday(Weekday::Mon));
    }

    #[test]
    fn parse_with_and_without_times() {
        let cal = ServiceCalendar::parse("Tuesday=5:15pm, wednesday ,Sunday=8:00am").unwrap();
        assert_eq!(cal.days().len(), 3);
        assert_eq!(cal.service_time("Tuesday"), Some("5:15pm"));
        assert_eq!(cal.service_time("Wednesday"), None);
        assert!(cal.recognizes("wed"));
    }

    #[test]
    fn parse_rejects_unknown_and_duplicate_days() {
        assert!(ServiceCalendar::parse("Funday").is_err());
        assert!(ServiceCalendar::parse("Sunday,Sun").is_err());
        assert!(ServiceCalendar::parse(" , ").is_err());
    }

    #[test]
    fn recognizes_is_case_insensitive() {
        let cal = ServiceCalendar::default();
        assert!(cal.recognizes("SUNDAY"));
        assert!(!cal.recognizes("Monday"));
        assert!(!cal.recognizes(""));
    }

    #[test]
    fn service_day_by_date() {
        let cal = ServiceCalendar::default();
        // 2024-06-02 was a Sunday, 2024-06-03 a Monday
        assert!(cal.is_service_day(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()));
        assert!(!cal.is_service_day(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()));
    }
}
