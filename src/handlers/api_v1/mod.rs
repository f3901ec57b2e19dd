use actix_web::{middleware::from_fn, web};

use crate::auth::middleware::{require_auth, require_json_content_type};
use crate::handlers::{admin_handlers, attendance_handlers, auth_handlers, check_in_handlers};

/// Configure API v1 routes. Everything here needs a logged-in member;
/// admin routes check the role themselves.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .wrap(from_fn(require_json_content_type))
            .wrap(from_fn(require_auth))
            .route("/me", web::get().to(auth_handlers::me))
            .route("/attendance", web::get().to(attendance_handlers::history))
            .route("/check-ins/today", web::get().to(check_in_handlers::today))
            .route("/check-ins", web::post().to(check_in_handlers::create))
            .service(
                web::scope("/admin")
                    .route("/members", web::get().to(admin_handlers::members))
                    .route("/absentees", web::get().to(admin_handlers::absent_members))
                    .route("/mark-absent", web::post().to(admin_handlers::mark_absent))
                    .route("/export/records.csv", web::get().to(admin_handlers::export_records))
                    .route("/export/members.csv", web::get().to(admin_handlers::export_members))
                    .route("/export/absentees.csv", web::get().to(admin_handlers::export_absentees)),
            ),
    );
}
