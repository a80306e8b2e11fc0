use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form,
};
use axum_extra::extract::cookie::CookieJar;

use crate::server::{
    cookies,
    error::ServerError,
    models::{LoginForm, LoginPageQuery},
    services::session::AuthorizeRequest,
    AppState,
};

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="th">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>เข้าสู่ระบบ</title>
    <style>
        body {
            margin: 0;
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            background: #F3F4F6;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
        }
        .card {
            background: white;
            border-radius: 12px;
            padding: 32px;
            box-shadow: 0 8px 32px rgba(0, 0, 0, 0.1);
            width: 320px;
        }
        h1 {
            color: #1F2937;
            margin: 0 0 24px 0;
            font-size: 20px;
            font-weight: 600;
            text-align: center;
        }
        label {
            display: block;
            color: #6B7280;
            font-size: 14px;
            margin-bottom: 4px;
        }
        input {
            width: 100%;
            box-sizing: border-box;
            padding: 10px;
            margin-bottom: 16px;
            border: 1px solid #D1D5DB;
            border-radius: 8px;
            font-size: 14px;
        }
        button {
            width: 100%;
            padding: 10px;
            background: #10B981;
            color: white;
            border: none;
            border-radius: 8px;
            font-size: 15px;
            cursor: pointer;
        }
    </style>
</head>
<body>
    <div class="card">
        <h1>เข้าสู่ระบบ</h1>
        <form method="post" action="/auth/login">
            <label for="username">ชื่อผู้ใช้</label>
            <input id="username" name="username" type="text" required>
            <label for="password">รหัสผ่าน</label>
            <input id="password" name="password" type="password" required>
            <input type="hidden" name="callbackUrl" value="{CALLBACK}">
            <button type="submit">เข้าสู่ระบบ</button>
        </form>
    </div>
</body>
</html>"#;

pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let callback = escape_attr(query.callback_url.as_deref().unwrap_or("/"));
    Html(LOGIN_HTML.replace("{CALLBACK}", &callback))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), ServerError> {
    let username = form.username.clone();

    let user = state
        .sessions
        .authorize(AuthorizeRequest::Credentials {
            username: form.username,
            password: form.password,
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

    let callback = sanitize_callback(form.callback_url.as_deref());
    tracing::info!(%username, "Credentials login successful");

    Ok((jar, Redirect::to(&callback)))
}

/// Only same-site paths are honored; anything else falls back to the root.
fn sanitize_callback(raw: Option<&str>) -> String {
    match raw {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}
