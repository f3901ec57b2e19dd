//! Shared test infrastructure for the HTTP integration tests.
//!
//! `FakeBackend` runs an in-process actix server standing in for both the
//! records endpoint (`/records`) and the REST API (`/api/...`). Tests flip
//! its state to simulate outages, seed roster rows and inspect what the
//! service posted.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, test, web};
use chrono::DateTime;
use regex::Regex;
use serde_json::{Value, json};

use attendance::auth::rate_limit::LoginLimiter;
use attendance::backend::BackendClient;
use attendance::clock::Clock;
use attendance::config::Config;
use attendance::models::{RecordStore, ServiceCalendar};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const MEMBER_EMAIL: &str = "ada@example.com";
pub const ADMIN_EMAIL: &str = "pastor@example.com";
pub const PASSWORD: &str = "secret";

/// Monday 2024-06-10, not a service day.
pub const MONDAY: &str = "2024-06-10T10:00:00+01:00";
/// Sunday 2024-06-09, a service day.
pub const SUNDAY: &str = "2024-06-09T09:00:00+01:00";

// ============================================================================
// FAKE BACKEND
// ============================================================================

#[derive(Default)]
pub struct FakeState {
    pub records: Mutex<Vec<Value>>,
    pub records_down: AtomicBool,
    pub posted: Mutex<Vec<HashMap<String, String>>>,
    pub roster: Mutex<Vec<Value>>,
    pub service_day: Mutex<Option<Value>>,
    pub mark_absent_calls: Mutex<Vec<Value>>,
}

impl FakeState {
    pub fn set_records_down(&self, down: bool) {
        self.records_down.store(down, Ordering::SeqCst);
    }
}

pub struct FakeBackend {
    pub url: String,
    pub state: web::Data<FakeState>,
}

impl FakeBackend {
    pub fn records_url(&self) -> String {
        format!("{}/records", self.url)
    }

    pub fn api_url(&self) -> String {
        format!("{}/api", self.url)
    }
}

fn user(email: &str) -> Option<Value> {
    match email {
        MEMBER_EMAIL => Some(json!({
            "id": 7,
            "first_name": "Ada",
            "last_name": "Obi",
            "email": MEMBER_EMAIL,
            "phone": "08030000001",
            "role": "member"
        })),
        ADMIN_EMAIL => Some(json!({
            "id": 1,
            "firstName": "Grace",
            "lastName": "Eze",
            "email": ADMIN_EMAIL,
            "phone": "08030000009",
            "role": "admin"
        })),
        _ => None,
    }
}

fn has_bearer(req: &HttpRequest) -> bool {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer token-"))
}

async fn get_records(state: web::Data<FakeState>) -> HttpResponse {
    if state.records_down.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().body("sheet offline");
    }
    let records = state.records.lock().unwrap().clone();
    HttpResponse::Ok().json(records)
}

/// Pull `name="Field"` parts out of a multipart body.
fn form_fields(body: &str) -> HashMap<String, String> {
    let re = Regex::new(r#"name="([^"]+)"\r\n\r\n([^\r]*)\r\n"#).unwrap();
    re.captures_iter(body)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect()
}

async fn post_record(state: web::Data<FakeState>, body: web::Bytes) -> HttpResponse {
    let fields = form_fields(&String::from_utf8_lossy(&body));
    let record: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    state.records.lock().unwrap().push(Value::Object(record));
    state.posted.lock().unwrap().push(fields);
    HttpResponse::Ok().json(json!({ "result": "success" }))
}

async fn login(body: web::Json<Value>) -> HttpResponse {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match user(email) {
        Some(user) if password == PASSWORD => HttpResponse::Ok().json(json!({
            "data": { "token": format!("token-{email}"), "user": user }
        })),
        _ => HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" })),
    }
}

async fn members(req: HttpRequest, state: web::Data<FakeState>) -> HttpResponse {
    if !has_bearer(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let roster = state.roster.lock().unwrap().clone();
    HttpResponse::Ok().json(json!({ "data": roster }))
}

async fn service_day_today(req: HttpRequest, state: web::Data<FakeState>) -> HttpResponse {
    if !has_bearer(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let day = state.service_day.lock().unwrap().clone();
    HttpResponse::Ok().json(json!({ "data": day }))
}

async fn mark_absent(req: HttpRequest, state: web::Data<FakeState>, body: web::Json<Value>) -> HttpResponse {
    if !has_bearer(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    state.mark_absent_calls.lock().unwrap().push(body.into_inner());
    HttpResponse::Ok().json(json!({ "message": "Absent members recorded" }))
}

/// Start the fake backend on an ephemeral port.
pub fn spawn_backend(records: Vec<Value>) -> FakeBackend {
    let state = web::Data::new(FakeState {
        records: Mutex::new(records),
        ..Default::default()
    });

    let data = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/records", web::get().to(get_records))
            .route("/records", web::post().to(post_record))
            .route("/api/auth/login", web::post().to(login))
            .route("/api/attendance/members", web::get().to(members))
            .route("/api/service-days/today", web::get().to(service_day_today))
            .route("/api/attendance/mark-absent", web::post().to(mark_absent))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .expect("bind fake backend");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    FakeBackend { url: format!("http://{addr}"), state }
}

// ============================================================================
// APP UNDER TEST
// ============================================================================

pub struct TestContext {
    pub backend: FakeBackend,
    pub config: web::Data<Config>,
    pub client: web::Data<BackendClient>,
    pub store: web::Data<RecordStore>,
    pub clock: web::Data<Clock>,
    pub limiter: web::Data<LoginLimiter>,
}

impl TestContext {
    /// App state wired to a fresh fake backend, with "now" pinned to `now`.
    pub fn new(now: &str, records: Vec<Value>) -> Self {
        Self::with_config(now, records, |_| {})
    }

    pub fn with_config(now: &str, records: Vec<Value>, adjust: impl FnOnce(&mut Config)) -> Self {
        let backend = spawn_backend(records);
        let mut config = Config {
            bind_addr: "127.0.0.1:0".to_string(),
            records_url: backend.records_url(),
            api_url: backend.api_url(),
            admin_emails: Vec::new(),
            calendar: ServiceCalendar::default(),
            utc_offset: None,
            http_timeout: Duration::from_secs(5),
            refresh_interval: None,
            session_key: None,
        };
        adjust(&mut config);
        let client = BackendClient::from_config(&config).expect("backend client");
        let clock = Clock::Fixed(DateTime::parse_from_rfc3339(now).expect("valid timestamp"));

        TestContext {
            backend,
            config: web::Data::new(config),
            client: web::Data::new(client),
            store: web::Data::new(RecordStore::new()),
            clock: web::Data::new(clock),
            limiter: web::Data::new(LoginLimiter::default()),
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.client.clone())
            .app_data(self.store.clone())
            .app_data(self.clock.clone())
            .app_data(self.limiter.clone())
            .configure(attendance::configure);
    }
}

// ============================================================================
// REQUEST HELPERS
// ============================================================================

pub fn login_request(email: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
}

/// The session cookie set by a login response.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .next()
        .map(|c| c.into_owned())
        .expect("login response sets a session cookie")
}

/// A check-in record the way the records endpoint stores it.
pub fn sheet_record(email: &str, service: &str, date: &str, time: &str) -> Value {
    let day = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date");
    json!({
        "Name": "Member",
        "Phone": "",
        "Email": email,
        "Service": service,
        "Month": day.format("%B").to_string(),
        "Week": "1",
        "Date": format!("{date}T08:00:00.000Z"),
        "Time": time,
        "Key": day.format("%A-%d-%B-%Y").to_string(),
        "Attendee": "physical"
    })
}

pub fn roster_row(id: u32, first: &str, last: &str, status: &str, date: &str) -> Value {
    json!({
        "id": id,
        "first_name": first,
        "last_name": last,
        "email": format!("{}@example.com", first.to_lowercase()),
        "service_name": "Sunday Service",
        "role": "member",
        "status": status,
        "attendance_date": date
    })
}
