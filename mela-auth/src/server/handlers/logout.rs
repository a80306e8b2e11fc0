use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;

use crate::server::cookies;

/// Destroy the application session and land on the root. The provider-side
/// session is the adapter's business, not ours.
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(cookies::clear_session_cookie());
    tracing::info!("Session cleared");
    (jar, Redirect::to("/"))
}
