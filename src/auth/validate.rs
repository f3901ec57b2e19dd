/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Some("Email must be a valid address (contain '@' and '.')".to_string());
    }
    None
}

/// Password strength is the backend's business; only reject empty or absurd input.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() > 256 {
        return Some("Password must be at most 256 characters".to_string());
    }
    None
}

/// Validate an optional `YYYY-MM-DD` query value (empty is OK).
pub fn validate_optional_date(value: &str, field_name: &str) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_err() {
        return Some(format!("{field_name} must be a date like 2024-06-09"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}
