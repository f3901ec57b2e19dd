use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::auth::session::current_member;
use crate::backend::BackendClient;
use crate::clock::Clock;
use crate::config::Config;
use crate::errors::AppError;
use crate::handlers::records::{self, Freshness};
use crate::models::check_in::find_today_record;
use crate::models::service_day::weekday_name;
use crate::models::{CheckInPayload, RecordStore, Source, format_time};

pub const NO_SERVICE_MESSAGE: &str = "No attendance available for this day. You can catch up with \
     previous services on YouTube and download audio messages on Telegram.";

#[derive(Debug, Serialize)]
pub struct TodayStatus {
    pub date: chrono::NaiveDate,
    pub day: &'static str,
    pub service_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub marked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<String>,
    #[serde(flatten)]
    pub freshness: Freshness,
}

/// GET /api/v1/check-ins/today
pub async fn today(
    session: Session,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    store: web::Data<RecordStore>,
    clock: web::Data<Clock>,
) -> Result<HttpResponse, AppError> {
    let member = current_member(&session)?;
    let today = clock.today();
    let day = weekday_name(today.weekday());
    let service_day = config.calendar.is_service_day(today);

    let loaded = records::load(&backend, &store, &clock, true).await?;
    let existing = find_today_record(&loaded.snapshot.records, &member, today);

    let status = TodayStatus {
        date: today,
        day,
        service_day,
        greeting: service_day.then(|| format!("Hello, {}", member.first_name.trim())),
        welcome: service_day.then(|| format!("Welcome To {day} Service!")),
        service_time: config.calendar.service_time(day).map(str::to_string),
        message: (!service_day).then(|| NO_SERVICE_MESSAGE.to_string()),
        marked: existing.is_some(),
        check_in_time: existing.map(|r| format_time(&r.time)),
        freshness: loaded.freshness,
    };
    Ok(HttpResponse::Ok().json(status))
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckInRequest {
    #[serde(default)]
    pub source: Source,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInOutcome {
    Marked,
    AlreadyMarked,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub status: CheckInOutcome,
    pub message: String,
    pub service: String,
    pub check_in_time: String,
}

/// POST /api/v1/check-ins - mark the logged-in member present for today's service.
pub async fn create(
    session: Session,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    store: web::Data<RecordStore>,
    clock: web::Data<Clock>,
    body: web::Json<CheckInRequest>,
) -> Result<HttpResponse, AppError> {
    let member = current_member(&session)?;
    let now = clock.now();
    let today = now.date_naive();

    if !config.calendar.is_service_day(today) {
        return Err(AppError::BadRequest(NO_SERVICE_MESSAGE.to_string()));
    }

    let loaded = records::load(&backend, &store, &clock, true).await?;
    if let Some(record) = find_today_record(&loaded.snapshot.records, &member, today) {
        log::info!("{} already checked in for {}", member.email, today);
        return Ok(HttpResponse::Ok().json(CheckInResponse {
            status: CheckInOutcome::AlreadyMarked,
            message: "Attendance Taken".to_string(),
            service: record.service.clone(),
            check_in_time: format_time(&record.time),
        }));
    }

    let payload = CheckInPayload::build(&member, now, body.source);
    backend.submit_check_in(&payload).await?;
    log::info!(
        "Recorded {} attendance for {} ({})",
        payload.attendee.as_str(),
        member.email,
        payload.key
    );

    if let Err(e) = records::refresh(&backend, &store, &clock).await {
        log::warn!("Records refresh after check-in failed: {e}");
    }

    Ok(HttpResponse::Created().json(CheckInResponse {
        status: CheckInOutcome::Marked,
        message: "Your attendance has been recorded".to_string(),
        service: payload.service.clone(),
        check_in_time: format_time(&payload.time),
    }))
}
