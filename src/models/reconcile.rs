//! Attendance reconciliation.
//!
//! Merges one member's check-in records with the expected calendar of service
//! days for the current month and derives a present/absent status per day.
//!
//! The expected range runs from the first of today's month through yesterday.
//! Today is never synthesized as absent (its service may still be under way);
//! it appears only when a record for it exists, and then always, whatever its
//! weekday.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::member::Member;
use super::record::CheckInRecord;
use super::service_day::{ServiceCalendar, weekday_name};

/// Keys owned by the reconciled output. Backend attributes with these names
/// are dropped so they cannot shadow the computed values.
const RESERVED_KEYS: &[&str] = &["date", "service", "time", "status", "check_in_time", "service_time"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One service day with the member's status for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledDay {
    pub date: NaiveDate,
    pub service: String,
    pub time: String,
    pub status: AttendanceStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReconciledDay {
    fn present(date: NaiveDate, record: &CheckInRecord) -> Self {
        ReconciledDay {
            date,
            service: record.service.clone(),
            time: record.time.clone(),
            status: AttendanceStatus::Present,
            extra: record
                .extra
                .iter()
                .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    fn absent(date: NaiveDate) -> Self {
        ReconciledDay {
            date,
            service: weekday_name(date.weekday()).to_string(),
            time: String::new(),
            status: AttendanceStatus::Absent,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// The reconciled list for one member. Month selection and ordering are views
/// over it and never recompute the merge.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceHistory {
    days: Vec<ReconciledDay>, // oldest first
}

impl AttendanceHistory {
    pub fn days(&self) -> &[ReconciledDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days in the selected month, in the requested order.
    pub fn view(&self, month: Month, order: SortOrder) -> Vec<ReconciledDay> {
        let mut days: Vec<ReconciledDay> = self
            .days
            .iter()
            .filter(|d| d.date.month() == month.number_from_month())
            .cloned()
            .collect();
        sort_days(&mut days, order);
        days
    }

    pub fn present_count(&self) -> usize {
        self.days.iter().filter(|d| d.status == AttendanceStatus::Present).count()
    }

    pub fn absent_count(&self) -> usize {
        self.days.iter().filter(|d| d.status == AttendanceStatus::Absent).count()
    }
}

pub fn sort_days(days: &mut [ReconciledDay], order: SortOrder) {
    match order {
        SortOrder::Oldest => days.sort_by(|a, b| a.date.cmp(&b.date)),
        SortOrder::Newest => days.sort_by(|a, b| b.date.cmp(&a.date)),
    }
}

/// Reconcile `records` for `member` as of `today`.
pub fn reconcile(
    records: &[CheckInRecord],
    member: &Member,
    today: NaiveDate,
    calendar: &ServiceCalendar,
) -> AttendanceHistory {
    let mine: Vec<&CheckInRecord> = records
        .iter()
        .filter(|r| member.owns(r) && calendar.recognizes(&r.service))
        .collect();

    // Later records win on a date collision
    let mut by_date: HashMap<NaiveDate, &CheckInRecord> = HashMap::new();
    for r in mine.iter().copied() {
        if let Some(date) = r.date {
            by_date.insert(date, r);
        }
    }

    let today_record = mine.iter().copied().find(|r| r.date == Some(today));

    let mut days = Vec::new();
    for date in expected_range(today) {
        if !calendar.is_service_day(date) {
            continue;
        }
        let day = match by_date.get(&date) {
            Some(record) => ReconciledDay::present(date, record),
            None => ReconciledDay::absent(date),
        };
        days.push(day);
    }

    if let Some(record) = today_record {
        days.push(ReconciledDay::present(today, record));
    }

    AttendanceHistory { days }
}

/// First day of today's month through yesterday. Empty on the 1st.
pub fn expected_range(today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let first = today.with_day(1).unwrap_or(today);
    first.iter_days().take_while(move |d| *d < today)
}

/// Accept a month as a name (`June`, `jun`) or a number (`6`).
pub fn parse_month(s: &str) -> Option<Month> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u8>() {
        return Month::try_from(n).ok();
    }
    Month::from_str(s).ok()
}
