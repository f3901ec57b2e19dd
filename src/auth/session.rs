use actix_session::Session;

use crate::backend::LoginSession;
use crate::errors::AppError;
use crate::models::Member;

const MEMBER_KEY: &str = "member";
const TOKEN_KEY: &str = "token";

/// Store a fresh login. The session id is renewed to avoid fixation.
pub fn save_login(session: &Session, login: &LoginSession) -> Result<(), AppError> {
    session.renew();
    session.insert(MEMBER_KEY, &login.member)?;
    session.insert(TOKEN_KEY, &login.token)?;
    Ok(())
}

pub fn has_member(session: &Session) -> bool {
    session.get::<Member>(MEMBER_KEY).ok().flatten().is_some()
}

/// The logged-in member, or `Unauthorized`.
pub fn current_member(session: &Session) -> Result<Member, AppError> {
    session.get::<Member>(MEMBER_KEY)?.ok_or(AppError::Unauthorized)
}

/// Bearer token for REST API calls made on the member's behalf.
pub fn api_token(session: &Session) -> Result<String, AppError> {
    session.get::<String>(TOKEN_KEY)?.ok_or(AppError::Unauthorized)
}

/// The logged-in member if they are an admin; `PermissionDenied` otherwise.
pub fn require_admin(session: &Session, admin_emails: &[String]) -> Result<Member, AppError> {
    let member = current_member(session)?;
    if member.is_admin(admin_emails) {
        Ok(member)
    } else {
        Err(AppError::PermissionDenied("admin only".to_string()))
    }
}

pub fn clear(session: &Session) {
    session.purge();
}
