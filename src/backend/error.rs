use std::fmt;

use crate::models::record::IngestError;

#[derive(Debug)]
pub enum BackendError {
    Http(reqwest::Error),
    Status { status: u16, message: String },
    Decode(String),
    InvalidShape(IngestError),
}

impl BackendError {
    /// True for 401/403 from the backend, i.e. the session token is no good.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, BackendError::Status { status: 401 | 403, .. })
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Http(e) => write!(f, "Backend request failed: {e}"),
            BackendError::Status { message, .. } => write!(f, "{message}"),
            BackendError::Decode(e) => write!(f, "Malformed backend response: {e}"),
            BackendError::InvalidShape(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Http(e)
    }
}

impl From<IngestError> for BackendError {
    fn from(e: IngestError) -> Self {
        BackendError::InvalidShape(e)
    }
}
