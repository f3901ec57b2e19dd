use actix_session::Session;
use actix_web::{HttpResponse, http::header, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::session::{api_token, require_admin};
use crate::auth::validate;
use crate::backend::BackendClient;
use crate::clock::Clock;
use crate::config::Config;
use crate::errors::AppError;
use crate::handlers::records;
use crate::models::check_in::records_for_day;
use crate::models::export::to_csv;
use crate::models::roster::{absentees, filter_members};
use crate::models::{RecordStore, RosterEntry, RosterFilter, paginate};

const ADMIN_PER_PAGE: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct MembersQuery {
    pub month: Option<u32>,
    pub date: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl MembersQuery {
    fn filter(&self) -> Result<RosterFilter, AppError> {
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(AppError::BadRequest("month must be between 1 and 12".to_string()));
            }
        }
        Ok(RosterFilter {
            month: self.month,
            date: parse_date(self.date.as_deref())?,
            search: self.search.clone().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AbsenteesQuery {
    pub date: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    #[default]
    All,
    Today,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordsExportQuery {
    #[serde(default)]
    pub scope: ExportScope,
}

#[derive(Debug, Serialize)]
pub struct MarkAbsentResponse {
    pub message: String,
    pub service_id: String,
    pub date: NaiveDate,
}

/// `None` for a missing or blank value; 400 for a malformed one.
fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Some(err) = validate::validate_optional_date(raw, "date") {
        return Err(AppError::BadRequest(err));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

fn check_search(search: Option<&str>) -> Result<(), AppError> {
    match validate::validate_optional(search.unwrap_or(""), "search", 100) {
        Some(err) => Err(AppError::BadRequest(err)),
        None => Ok(()),
    }
}

async fn roster(session: &Session, backend: &BackendClient) -> Result<Vec<RosterEntry>, AppError> {
    let token = api_token(session)?;
    Ok(backend.fetch_roster(&token).await?)
}

fn csv_download(filename: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(body)
}

/// GET /api/v1/admin/members - member attendance list, filtered and paged.
pub async fn members(
    session: Session,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    query: web::Query<MembersQuery>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session, &config.admin_emails)?;
    let filter = query.filter()?;
    check_search(query.search.as_deref())?;
    let entries = roster(&session, &backend).await?;

    let matched = filter_members(&entries, &filter);
    Ok(HttpResponse::Ok().json(paginate(matched, query.page, query.per_page, ADMIN_PER_PAGE)))
}

/// GET /api/v1/admin/absentees - members marked absent on a date (default today).
pub async fn absent_members(
    session: Session,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    clock: web::Data<Clock>,
    query: web::Query<AbsenteesQuery>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session, &config.admin_emails)?;
    let date = parse_date(query.date.as_deref())?.unwrap_or_else(|| clock.today());
    check_search(query.search.as_deref())?;
    let entries = roster(&session, &backend).await?;

    let absent = absentees(&entries, date, query.search.as_deref().unwrap_or(""));
    Ok(HttpResponse::Ok().json(paginate(absent, query.page, query.per_page, ADMIN_PER_PAGE)))
}

/// POST /api/v1/admin/mark-absent - mark everyone not checked in today as absent.
pub async fn mark_absent(
    session: Session,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    clock: web::Data<Clock>,
) -> Result<HttpResponse, AppError> {
    let admin = require_admin(&session, &config.admin_emails)?;
    let token = api_token(&session)?;
    let today = clock.today();

    let service_id = backend
        .fetch_service_day(&token)
        .await?
        .ok_or_else(|| AppError::NotFound("Service Day not found, please try again later.".to_string()))?;

    let message = backend.mark_absent(&token, &service_id, today).await?;
    log::info!("{} marked absentees for service day {service_id} on {today}", admin.email);

    Ok(HttpResponse::Ok().json(MarkAbsentResponse { message, service_id, date: today }))
}

/// GET /api/v1/admin/export/records.csv?scope=all|today
pub async fn export_records(
    session: Session,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    store: web::Data<RecordStore>,
    clock: web::Data<Clock>,
    query: web::Query<RecordsExportQuery>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session, &config.admin_emails)?;
    let now = clock.now();

    let loaded = records::load(&backend, &store, &clock, true).await?;
    let (rows, prefix) = match query.scope {
        ExportScope::All => (loaded.snapshot.records.to_vec(), "attendance-data"),
        ExportScope::Today => (records_for_day(&loaded.snapshot.records, now.date_naive()), "today-attendance"),
    };

    let body = to_csv(&rows)?;
    let filename = format!("{prefix}-{}.csv", now.format("%Y-%m-%d-%H-%M"));
    log::info!("Exporting {} records as {filename}", rows.len());
    Ok(csv_download(&filename, body))
}

/// GET /api/v1/admin/export/members.csv - same filters as the member list, unpaged.
pub async fn export_members(
    session: Session,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    query: web::Query<MembersQuery>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session, &config.admin_emails)?;
    let filter = query.filter()?;
    let entries = roster(&session, &backend).await?;

    let body = to_csv(&filter_members(&entries, &filter))?;
    Ok(csv_download("members.csv", body))
}

/// GET /api/v1/admin/export/absentees.csv
pub async fn export_absentees(
    session: Session,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    clock: web::Data<Clock>,
    query: web::Query<AbsenteesQuery>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session, &config.admin_emails)?;
    let date = parse_date(query.date.as_deref())?.unwrap_or_else(|| clock.today());
    let entries = roster(&session, &backend).await?;

    let body = to_csv(&absentees(&entries, date, query.search.as_deref().unwrap_or("")))?;
    Ok(csv_download(&format!("absent-members-{}.csv", date.format("%Y-%m-%d")), body))
}
