use serde::{Deserialize, Serialize};

use super::record::{CheckInRecord, lenient_string};

/// The logged-in member, as returned by the backend profile endpoint.
///
/// Stored in the cookie session after login; every handler reads it through
/// `auth::session::current_member` instead of ambient global state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, alias = "firstName", alias = "First Name")]
    pub first_name: String,
    #[serde(default, alias = "lastName", alias = "Last Name")]
    pub last_name: String,
    #[serde(default, alias = "Email")]
    pub email: String,
    #[serde(
        default,
        alias = "Phone",
        alias = "PhoneNumber",
        alias = "phoneNumber",
        alias = "phone_number",
        deserialize_with = "lenient_string"
    )]
    pub phone: String,
    #[serde(default)]
    pub role: String,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Admins are members with role `admin` or an email on the configured list.
    pub fn is_admin(&self, admin_emails: &[String]) -> bool {
        if self.role.eq_ignore_ascii_case("admin") {
            return true;
        }
        let email = self.email.trim();
        !email.is_empty() && admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email))
    }

    /// A record belongs to this member by case-insensitive email or exact phone.
    /// Empty identity fields never match.
    pub fn owns(&self, record: &CheckInRecord) -> bool {
        let email = self.email.trim();
        if !email.is_empty() && record.email.eq_ignore_ascii_case(email) {
            return true;
        }
        let phone = self.phone.trim();
        !phone.is_empty() && record.phone == phone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(email: &str, phone: &str) -> CheckInRecord {
        CheckInRecord::from_value(json!({ "Email": email, "Phone": phone })).unwrap()
    }

    #[test]
    fn deserializes_backend_casings() {
        let m: Member = serde_json::from_value(json!({
            "id": 42,
            "firstName": "Ada",
            "last_name": "Obi",
            "Email": "ada@example.com",
            "PhoneNumber": 8030000000u64,
            "role": "member"
        }))
        .unwrap();
        assert_eq!(m.id, "42");
        assert_eq!(m.full_name(), "Ada Obi");
        assert_eq!(m.email, "ada@example.com");
        assert_eq!(m.phone, "8030000000");
    }

    #[test]
    fn owns_by_email_ignoring_case() {
        let m = Member { email: "Ada@Example.com".into(), ..Default::default() };
        assert!(m.owns(&record("ada@example.COM", "")));
        assert!(!m.owns(&record("bob@example.com", "")));
    }

    #[test]
    fn owns_by_phone() {
        let m = Member { phone: "0803".into(), ..Default::default() };
        assert!(m.owns(&record("", "0803")));
        assert!(!m.owns(&record("", "0804")));
    }

    #[test]
    fn empty_identity_matches_nothing() {
        let m = Member::default();
        assert!(!m.owns(&record("", "")));
        assert!(!m.owns(&record("a@x.com", "0803")));
    }

    #[test]
    fn admin_by_role_or_configured_email() {
        let admins = vec!["pastor@example.com".to_string()];
        let by_role = Member { role: "Admin".into(), ..Default::default() };
        let by_email = Member { email: "PASTOR@example.com".into(), ..Default::default() };
        let plain = Member { email: "ada@example.com".into(), role: "member".into(), ..Default::default() };
        assert!(by_role.is_admin(&admins));
        assert!(by_email.is_admin(&admins));
        assert!(!plain.is_admin(&admins));
        assert!(!Member::default().is_admin(&admins));
    }
}
