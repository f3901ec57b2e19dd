use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::service_day::canonical_service;

const EMAIL_FIELDS: &[&str] = &["Email", "email"];
const PHONE_FIELDS: &[&str] = &["Phone", "phone", "PhoneNumber", "phoneNumber"];
const NAME_FIELDS: &[&str] = &["Name", "name"];
const SERVICE_FIELDS: &[&str] = &["Service", "service"];
const TIME_FIELDS: &[&str] = &["Time", "time"];
const KEY_FIELDS: &[&str] = &["Key", "key"];
const DATE_FIELDS: &[&str] = &["Date", "date"];

/// One attendance event in canonical form, whatever casing the backend used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInRecord {
    pub email: String,
    pub phone: String,
    pub name: String,
    /// Canonical weekday name when recognizable, otherwise the raw value.
    pub service: String,
    pub date: Option<NaiveDate>,
    pub key: String,
    pub time: String,
    /// Attributes the backend sent beyond the known fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    InvalidShape,
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::InvalidShape => write!(f, "Invalid data format received from records endpoint"),
        }
    }
}

impl std::error::Error for IngestError {}

/// Accept either a bare array of records or `{ "data": [...] }`.
pub fn parse_records_payload(body: Value) -> Result<Vec<CheckInRecord>, IngestError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Err(IngestError::InvalidShape),
        },
        _ => return Err(IngestError::InvalidShape),
    };

    let total = items.len();
    let records: Vec<CheckInRecord> = items.into_iter().filter_map(CheckInRecord::from_value).collect();
    if records.len() < total {
        log::warn!("Skipped {} non-object entries in records payload", total - records.len());
    }
    Ok(records)
}

impl CheckInRecord {
    /// Normalize one backend object. Returns `None` for non-objects.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut obj) = value else {
            return None;
        };

        let email = take_field(&mut obj, EMAIL_FIELDS);
        let phone = take_field(&mut obj, PHONE_FIELDS);
        let name = take_field(&mut obj, NAME_FIELDS);
        let raw_service = take_field(&mut obj, SERVICE_FIELDS);
        let time = take_field(&mut obj, TIME_FIELDS);
        let key = take_field(&mut obj, KEY_FIELDS);
        let raw_date = take_field(&mut obj, DATE_FIELDS);

        let service = canonical_service(&raw_service)
            .map(str::to_string)
            .unwrap_or(raw_service);
        let date = parse_record_date(&key).or_else(|| parse_record_date(&raw_date));

        // `date` only holds the calendar day; keep the backend's original value too.
        if !raw_date.is_empty() {
            obj.insert("raw_date".to_string(), Value::String(raw_date));
        }

        Some(CheckInRecord {
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
            name,
            service,
            date,
            key,
            time,
            extra: obj,
        })
    }
}

/// Remove the first present variant of a field and render it as a string.
fn take_field(obj: &mut Map<String, Value>, names: &[&str]) -> String {
    let mut found = None;
    for name in names {
        if let Some(v) = obj.remove(*name) {
            if found.is_none() {
                found = Some(v);
            }
        }
    }
    found.map(value_to_string).unwrap_or_default()
}

fn value_to_string(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Serde helper for identity fields that spreadsheets send as numbers.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.map(value_to_string).unwrap_or_default())
}

/// Parse the calendar date of a record.
///
/// Accepted forms: `2024-06-10`, `2024-06-10T07:15:00.000Z` (date as written),
/// the grouping key `Monday-10-June-2024` (short month names too) and
/// `Mon Jun 10 2024 08:15:00 GMT+0100 (...)`.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    if s.len() > 10 && s.is_char_boundary(10) {
        let (head, tail) = s.split_at(10);
        if tail.starts_with('T') || tail.starts_with(' ') {
            if let Ok(d) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
                return Some(d);
            }
        }
    }

    // Grouping key: the weekday prefix is informational only
    if let Some((_, rest)) = s.split_once('-') {
        if let Ok(d) = NaiveDate::parse_from_str(rest, "%d-%B-%Y") {
            return Some(d);
        }
    }

    let tokens: Vec<&str> = s.split_whitespace().collect();
    if tokens.len() >= 4 {
        let joined = tokens[1..4].join(" ");
        if let Ok(d) = NaiveDate::parse_from_str(&joined, "%b %d %Y") {
            return Some(d);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_every_accepted_date_form() {
        assert_eq!(parse_record_date("2024-06-10"), Some(d(2024, 6, 10)));
        assert_eq!(parse_record_date("2024-06-10T07:15:00.000Z"), Some(d(2024, 6, 10)));
        assert_eq!(parse_record_date("Monday-10-June-2024"), Some(d(2024, 6, 10)));
        assert_eq!(parse_record_date("Tuesday-04-Jun-2024"), Some(d(2024, 6, 4)));
        assert_eq!(
            parse_record_date("Mon Jun 10 2024 08:15:00 GMT+0100 (West Africa Standard Time)"),
            Some(d(2024, 6, 10))
        );
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(parse_record_date(""), None);
        assert_eq!(parse_record_date("yesterday"), None);
        assert_eq!(parse_record_date("2024-13-40"), None);
    }

    #[test]
    fn normalizes_capitalized_fields() {
        let rec = CheckInRecord::from_value(json!({
            "Email": "A@X.com ",
            "Phone": 8012345678u64,
            "Service": "sunday",
            "Key": "Sunday-02-June-2024",
            "Time": "08:15",
            "Attendee": "online"
        }))
        .unwrap();
        assert_eq!(rec.email, "A@X.com");
        assert_eq!(rec.phone, "8012345678");
        assert_eq!(rec.service, "Sunday");
        assert_eq!(rec.date, Some(d(2024, 6, 2)));
        assert_eq!(rec.time, "08:15");
        assert_eq!(rec.extra.get("Attendee"), Some(&json!("online")));
    }

    #[test]
    fn falls_back_to_date_field_when_key_is_missing() {
        let rec = CheckInRecord::from_value(json!({
            "email": "a@x.com",
            "service": "Friday",
            "Date": "2024-06-07T16:40:00.000Z"
        }))
        .unwrap();
        assert_eq!(rec.date, Some(d(2024, 6, 7)));
        assert!(rec.key.is_empty());
        assert_eq!(rec.extra.get("raw_date"), Some(&json!("2024-06-07T16:40:00.000Z")));
    }

    #[test]
    fn unknown_service_is_kept_raw() {
        let rec = CheckInRecord::from_value(json!({ "Service": "Vigil" })).unwrap();
        assert_eq!(rec.service, "Vigil");
        assert_eq!(rec.date, None);
    }

    #[test]
    fn payload_accepts_both_shapes() {
        let bare = json!([{ "Email": "a@x.com" }, "junk", 3]);
        assert_eq!(parse_records_payload(bare).unwrap().len(), 1);

        let wrapped = json!({ "data": [{ "email": "a@x.com" }, { "email": "b@x.com" }] });
        assert_eq!(parse_records_payload(wrapped).unwrap().len(), 2);
    }

    #[test]
    fn payload_rejects_other_shapes() {
        assert_eq!(parse_records_payload(json!({ "rows": [] })), Err(IngestError::InvalidShape));
        assert_eq!(parse_records_payload(json!("nope")), Err(IngestError::InvalidShape));
        assert_eq!(parse_records_payload(json!({ "data": {} })), Err(IngestError::InvalidShape));
    }
}
