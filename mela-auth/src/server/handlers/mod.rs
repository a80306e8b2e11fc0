mod liff;
mod login;
mod logout;
mod session;

pub use liff::liff_exchange;
pub use login::{login, login_page};
pub use logout::logout;
pub use session::current_session;

use crate::server::models::HealthResponse;
use axum::response::Html;
use axum::Json;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Catch-all page shell. The mini-app and dashboard UIs live elsewhere;
/// this keeps every path inside the route gate.
pub async fn app_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="th">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>mela</title>
</head>
<body>
    <div id="app"></div>
</body>
</html>"#,
    )
}
