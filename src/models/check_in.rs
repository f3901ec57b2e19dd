use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};

use super::member::Member;
use super::record::CheckInRecord;
use super::service_day::weekday_name;

/// How the member is attending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Physical,
    Online,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Physical => "physical",
            Source::Online => "online",
        }
    }
}

/// Form posted to the records endpoint for one check-in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInPayload {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    pub month: String,
    pub week: u32,
    pub date: String,
    pub time: String,
    pub key: String,
    pub attendee: Source,
}

impl CheckInPayload {
    pub fn build(member: &Member, now: DateTime<FixedOffset>, source: Source) -> Self {
        let today = now.date_naive();
        CheckInPayload {
            name: member.full_name(),
            phone: member.phone.clone(),
            email: member.email.clone(),
            service: weekday_name(today.weekday()).to_string(),
            month: today.format("%B").to_string(),
            week: week_of_month(today),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, false),
            time: now.format("%I:%M %p").to_string(),
            key: grouping_key(today),
            attendee: source,
        }
    }

    /// Field names as the records endpoint stores them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Phone", self.phone.clone()),
            ("Email", self.email.clone()),
            ("Service", self.service.clone()),
            ("Month", self.month.clone()),
            ("Week", self.week.to_string()),
            ("Date", self.date.clone()),
            ("Time", self.time.clone()),
            ("Key", self.key.clone()),
            ("Attendee", self.attendee.as_str().to_string()),
        ]
    }
}

/// `Monday-10-June-2024`: identifies one service occurrence.
pub fn grouping_key(date: NaiveDate) -> String {
    date.format("%A-%d-%B-%Y").to_string()
}

/// 1 for days 1-7, 2 for 8-14, and so on.
pub fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

/// The member's existing record for `today`, matched by grouping key or date.
pub fn find_today_record<'a>(
    records: &'a [CheckInRecord],
    member: &Member,
    today: NaiveDate,
) -> Option<&'a CheckInRecord> {
    let key = grouping_key(today);
    records
        .iter()
        .find(|r| member.owns(r) && (r.key == key || r.date == Some(today)))
}

/// All records (any member) for `today`, used by the admin "today" export.
pub fn records_for_day(records: &[CheckInRecord], today: NaiveDate) -> Vec<CheckInRecord> {
    let key = grouping_key(today);
    records
        .iter()
        .filter(|r| r.key == key || r.date == Some(today))
        .cloned()
        .collect()
}
