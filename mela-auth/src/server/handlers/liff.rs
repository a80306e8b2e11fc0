use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::server::{
    cookies,
    error::ServerError,
    models::{LiffExchangeRequest, SessionResponse},
    services::session::AuthorizeRequest,
    AppState,
};

/// Exchange a verified LIFF identity for an application session. Called by
/// the page-side bootstrap once the provider reports a logged-in user.
pub async fn liff_exchange(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LiffExchangeRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ServerError> {
    if req.line_user_id.is_empty() {
        return Err(ServerError::BadRequest("lineUserId is required".to_string()));
    }

    let user = state
        .sessions
        .authorize(AuthorizeRequest::Liff {
            line_user_id: req.line_user_id,
            display_name: req.display_name,
            picture_url: req.picture_url,
            access_token: req.access_token,
        })
        .await?;

    let issued = state
        .sessions
        .issue(&user)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    let jar = jar.add(cookies::session_cookie(
        &issued.token,
        state.sessions.max_age_days(),
        state.secure_cookies,
    ));

    tracing::info!(user_id = %user.id(), "LIFF session established");

    Ok((
        jar,
        Json(SessionResponse {
            user,
            expires_at: issued.expires_at,
        }),
    ))
}
