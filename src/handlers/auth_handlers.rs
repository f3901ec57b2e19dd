use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::auth::{rate_limit::LoginLimiter, session, validate};
use crate::backend::BackendClient;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::Member;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub member: Member,
    pub name: String,
    pub admin: bool,
}

impl MeResponse {
    fn new(member: Member, config: &Config) -> Self {
        Self {
            name: member.full_name(),
            admin: member.is_admin(&config.admin_emails),
            member,
        }
    }
}

/// POST /login - authenticate against the backend and start a session.
pub async fn login(
    req: HttpRequest,
    session: Session,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    limiter: web::Data<LoginLimiter>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    // Rate-limit check before calling the backend
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        log::warn!("Login blocked for {ip}: too many failed attempts");
        return Ok(HttpResponse::TooManyRequests().json(serde_json::json!({
            "error": "Too many failed login attempts. Please try again later."
        })));
    }

    let mut errors = Vec::new();
    errors.extend(validate::validate_email(&body.email));
    errors.extend(validate::validate_password(&body.password));
    if !errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Validation failed",
            "details": errors.join("; "),
        })));
    }

    let login = match backend.login(body.email.trim(), &body.password).await {
        Ok(login) => login,
        Err(e) if e.is_auth_failure() => {
            limiter.record_failure(ip);
            log::info!("Failed login for {}", body.email.trim());
            return Ok(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            })));
        }
        Err(e) => return Err(e.into()),
    };

    limiter.clear(ip);
    session::save_login(&session, &login)?;
    log::info!("{} logged in", login.member.email);

    Ok(HttpResponse::Ok().json(MeResponse::new(login.member, &config)))
}

/// POST /logout
pub async fn logout(session: Session) -> HttpResponse {
    session::clear(&session);
    HttpResponse::Ok().json(serde_json::json!({ "message": "Logged out" }))
}

/// GET /api/v1/me
pub async fn me(session: Session, config: web::Data<Config>) -> Result<HttpResponse, AppError> {
    let member = session::current_member(&session)?;
    Ok(HttpResponse::Ok().json(MeResponse::new(member, &config)))
}
