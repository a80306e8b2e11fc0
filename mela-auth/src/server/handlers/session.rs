use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::server::{
    cookies::{self, SESSION_COOKIE_NAME},
    error::ServerError,
    models::{SessionQuery, SessionResponse},
    AppState,
};

/// Validated read of the current session. Every successful read re-issues
/// the cookie, sliding the 30-day window forward.
pub async fn current_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<SessionQuery>,
) -> Result<(CookieJar, Json<SessionResponse>), ServerError> {
    let token = jar
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ServerError::Unauthorized("No session".to_string()))?;

    let user = state.sessions.verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        ServerError::Unauthorized("Invalid or expired session".to_string())
    })?;

    if query.require.as_deref() == Some("liff") && !user.is_liff() {
        return Err(ServerError::Forbidden("LINE login required".to_string()));
    }

    let issued = state
        .sessions
        .issue(&user)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    let jar = jar.add(cookies::session_cookie(
        &issued.token,
        state.sessions.max_age_days(),
        state.secure_cookies,
    ));

    Ok((
        jar,
        Json(SessionResponse {
            user,
            expires_at: issued.expires_at,
        }),
    ))
}
