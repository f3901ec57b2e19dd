use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::{IngestError, lenient_string, parse_record_date};

/// One row of the admin member attendance list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: String,
    #[serde(default, alias = "Email")]
    pub email: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_date: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RosterEntry {
    /// Attendance date, falling back to the creation timestamp.
    pub fn attendance_day(&self) -> Option<NaiveDate> {
        self.attendance_date
            .as_deref()
            .and_then(parse_record_date)
            .or_else(|| self.created_at.as_deref().and_then(parse_record_date))
    }

    /// The day the row was marked on. Unlike `attendance_day`, no fallback.
    pub fn marked_day(&self) -> Option<NaiveDate> {
        self.attendance_date.as_deref().and_then(parse_record_date)
    }

    pub fn is_absent(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("absent")
    }

    /// Case-insensitive match on first, last or "first last". Empty search matches all.
    pub fn name_matches(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let first = self.first_name.to_lowercase();
        let last = self.last_name.to_lowercase();
        let full = format!("{first} {last}");
        first.contains(&needle) || last.contains(&needle) || full.trim().contains(&needle)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterFilter {
    pub month: Option<u32>,
    pub date: Option<NaiveDate>,
    pub search: String,
}

impl RosterFilter {
    /// Entries without a usable date fail any month or date filter.
    pub fn matches(&self, entry: &RosterEntry) -> bool {
        let day = entry.attendance_day();
        if let Some(month) = self.month {
            if day.map(|d| d.month()) != Some(month) {
                return false;
            }
        }
        if let Some(date) = self.date {
            if day != Some(date) {
                return false;
            }
        }
        entry.name_matches(&self.search)
    }
}

pub fn filter_members(entries: &[RosterEntry], filter: &RosterFilter) -> Vec<RosterEntry> {
    entries.iter().filter(|e| filter.matches(e)).cloned().collect()
}

/// Members marked absent on `date`, optionally narrowed by name.
pub fn absentees(entries: &[RosterEntry], date: NaiveDate, search: &str) -> Vec<RosterEntry> {
    entries
        .iter()
        .filter(|e| e.marked_day() == Some(date) && e.is_absent() && e.name_matches(search))
        .cloned()
        .collect()
}

/// Parse `{ "data": [...] }` (or a bare array). Rows that do not fit are skipped.
pub fn parse_roster_payload(body: Value) -> Result<Vec<RosterEntry>, IngestError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            _ => return Err(IngestError::InvalidShape),
        },
        _ => return Err(IngestError::InvalidShape),
    };

    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<RosterEntry>(item) {
            Ok(e) => entries.push(e),
            Err(e) => log::warn!("Skipping malformed roster row: {e}"),
        }
    }
    Ok(entries)
}
