pub mod admin_handlers;
pub mod api_v1;
pub mod attendance_handlers;
pub mod auth_handlers;
pub mod check_in_handlers;
pub mod records;

use actix_web::{HttpResponse, web};

use crate::models::RecordStore;

/// GET /health
pub async fn health(store: web::Data<RecordStore>) -> HttpResponse {
    let snapshot = store.latest();
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "records_cached": snapshot.as_ref().map(|s| s.records.len()),
        "records_fetched_at": snapshot.map(|s| s.fetched_at),
    }))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Not found" }))
}
