//! HTTP access to the external backend.
//!
//! Two surfaces: the spreadsheet-backed records endpoint (plain GET of every
//! check-in, multipart POST of a new one) and the REST API (auth, roster,
//! service days), which takes JSON and the session's bearer token.

mod error;

pub use error::BackendError;

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Method, header};
use serde_json::{Value, json};

use crate::config::Config;
use crate::models::record::parse_records_payload;
use crate::models::roster::parse_roster_payload;
use crate::models::{CheckInPayload, CheckInRecord, Member, RosterEntry};

/// Decoded response body: JSON when the backend says so, otherwise text.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    pub fn into_json(self) -> Result<Value, BackendError> {
        match self {
            Body::Json(v) => Ok(v),
            Body::Text(t) => serde_json::from_str(&t).map_err(|e| BackendError::Decode(e.to_string())),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: String,
    pub member: Member,
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    records_url: String,
    api_url: String,
}

impl BackendClient {
    pub fn new(records_url: &str, api_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            records_url: records_url.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        Self::new(&config.records_url, &config.api_url, config.http_timeout)
    }

    /// Every check-in record, normalized. Accepts `[...]` or `{ data: [...] }`.
    pub async fn fetch_records(&self) -> Result<Vec<CheckInRecord>, BackendError> {
        let res = self.http.get(&self.records_url).send().await?;
        let body = read_body(res).await?.into_json()?;
        let records = parse_records_payload(body)?;
        log::debug!("Fetched {} check-in records", records.len());
        Ok(records)
    }

    /// Post one check-in to the records endpoint as a multipart form.
    pub async fn submit_check_in(&self, payload: &CheckInPayload) -> Result<Body, BackendError> {
        let form = payload
            .form_fields()
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| form.text(name, value));
        let res = self.http.post(&self.records_url).multipart(form).send().await?;
        read_body(res).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, BackendError> {
        let body = json!({ "email": email, "password": password });
        let resp = self
            .api(Method::POST, "/auth/login", None, Some(&body))
            .await?
            .into_json()?;

        let data = resp.get("data").filter(|d| d.is_object()).unwrap_or(&resp);
        let token = ["token", "access_token", "accessToken"]
            .iter()
            .find_map(|k| data.get(*k).and_then(Value::as_str))
            .ok_or_else(|| BackendError::Decode("login response has no token".to_string()))?
            .to_string();
        let member = match data.get("user") {
            Some(user) => serde_json::from_value(user.clone()).map_err(|e| BackendError::Decode(e.to_string()))?,
            None => self.fetch_profile(&token).await?,
        };
        Ok(LoginSession { token, member })
    }

    pub async fn fetch_profile(&self, token: &str) -> Result<Member, BackendError> {
        let resp = self
            .api(Method::GET, "/auth/profile", Some(token), None)
            .await?
            .into_json()?;
        let user = resp
            .get("data")
            .map(|d| d.get("user").unwrap_or(d))
            .or_else(|| resp.get("user"))
            .cloned()
            .ok_or_else(|| BackendError::Decode("profile response has no user".to_string()))?;
        serde_json::from_value(user).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Admin member attendance list.
    pub async fn fetch_roster(&self, token: &str) -> Result<Vec<RosterEntry>, BackendError> {
        let resp = self
            .api(Method::GET, "/attendance/members", Some(token), None)
            .await?
            .into_json()?;
        Ok(parse_roster_payload(resp)?)
    }

    /// Id of today's service day, if the backend has one.
    pub async fn fetch_service_day(&self, token: &str) -> Result<Option<String>, BackendError> {
        let resp = self
            .api(Method::GET, "/service-days/today", Some(token), None)
            .await?
            .into_json()?;
        let id = resp.get("data").and_then(|d| d.get("id")).and_then(|id| match id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        Ok(id)
    }

    /// Mark every member not checked in as absent for `service_id` on `date`.
    /// Returns the backend's message.
    pub async fn mark_absent(
        &self,
        token: &str,
        service_id: &str,
        date: NaiveDate,
    ) -> Result<String, BackendError> {
        let body = json!({ "service_id": service_id, "date": date.format("%Y-%m-%d").to_string() });
        let resp = self
            .api(Method::POST, "/attendance/mark-absent", Some(token), Some(&body))
            .await?;
        let message = match resp {
            Body::Json(v) => v.get("message").and_then(Value::as_str).map(str::to_string),
            Body::Text(t) if !t.trim().is_empty() => Some(t),
            Body::Text(_) => None,
        };
        Ok(message.unwrap_or_else(|| "Attendance submitted successfully".to_string()))
    }

    async fn api(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Body, BackendError> {
        let url = format!("{}{}", self.api_url, path);
        let mut req = self
            .http
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.body(body.to_string());
        }
        read_body(req.send().await?).await
    }
}

async fn read_body(res: reqwest::Response) -> Result<Body, BackendError> {
    let status = res.status();
    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let text = res.text().await?;

    if !status.is_success() {
        let message = if text.trim().is_empty() {
            format!("Request failed with status {}", status.as_u16())
        } else {
            text
        };
        return Err(BackendError::Status { status: status.as_u16(), message });
    }

    if is_json {
        serde_json::from_str(&text)
            .map(Body::Json)
            .map_err(|e| BackendError::Decode(e.to_string()))
    } else {
        Ok(Body::Text(text))
    }
}
