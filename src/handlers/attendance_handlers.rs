use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Datelike, Month};
use serde::{Deserialize, Serialize};

use crate::auth::session::current_member;
use crate::backend::BackendClient;
use crate::clock::Clock;
use crate::config::Config;
use crate::errors::AppError;
use crate::handlers::records::{self, Freshness};
use crate::models::reconcile::parse_month;
use crate::models::{
    AttendanceStatus, Page, RecordStore, ReconciledDay, SortOrder, format_time, paginate, reconcile,
};

const HISTORY_PER_PAGE: usize = 4;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub month: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    /// `false` re-filters the last snapshot without fetching.
    pub refresh: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    #[serde(flatten)]
    pub day: ReconciledDay,
    pub check_in_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub month: String,
    pub order: SortOrder,
    pub present: usize,
    pub absent: usize,
    #[serde(flatten)]
    pub freshness: Freshness,
    #[serde(flatten)]
    pub page: Page<HistoryItem>,
}

/// GET /api/v1/attendance - the logged-in member's reconciled history for one month.
pub async fn history(
    session: Session,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    store: web::Data<RecordStore>,
    clock: web::Data<Clock>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let member = current_member(&session)?;
    let today = clock.today();

    let month = match query.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(raw) => parse_month(raw).ok_or_else(|| AppError::BadRequest(format!("Unknown month '{raw}'")))?,
        None => Month::try_from(today.month() as u8)
            .map_err(|_| AppError::BadRequest("Invalid current month".to_string()))?,
    };

    let loaded = records::load(&backend, &store, &clock, query.refresh.unwrap_or(true)).await?;
    let history = reconcile(&loaded.snapshot.records, &member, today, &config.calendar);
    let days = history.view(month, query.order);

    let present = days.iter().filter(|d| d.status == AttendanceStatus::Present).count();
    let absent = days.len() - present;

    let items: Vec<HistoryItem> = days
        .into_iter()
        .map(|day| HistoryItem {
            check_in_time: format_time(&day.time),
            service_time: config.calendar.service_time(&day.service).map(str::to_string),
            day,
        })
        .collect();

    Ok(HttpResponse::Ok().json(HistoryResponse {
        month: month.name().to_string(),
        order: query.order,
        present,
        absent,
        freshness: loaded.freshness,
        page: paginate(items, query.page, query.per_page, HISTORY_PER_PAGE),
    }))
}
