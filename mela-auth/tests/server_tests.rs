use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;
use tower_http::set_header::SetResponseHeaderLayer;

use mela_auth::common::{LiffRouting, LiffSettings, SessionUser};
use mela_auth::server::services::backend::{AuthBackend, BackendError, BackendUser};
use mela_auth::server::services::SessionService;
use mela_auth::server::{gate, handlers, AppState};

struct StubBackend {
    login_ok: bool,
}

#[async_trait::async_trait]
impl AuthBackend for StubBackend {
    async fn login(&self, username: &str, _password: &str) -> Result<BackendUser, BackendError> {
        if self.login_ok {
            Ok(BackendUser {
                id: "42".to_string(),
                name: username.to_string(),
                email: Some("somchai@example.com".to_string()),
            })
        } else {
            Err(BackendError::Rejected("password mismatch".to_string()))
        }
    }

    async fn verify_liff(&self, _: &str, _: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

fn state(login_ok: bool) -> AppState {
    let sessions = Arc::new(SessionService::new(
        Arc::new(StubBackend { login_ok }),
        "integration-secret",
        30,
        false,
    ));
    let routing = Arc::new(LiffRouting::from_settings(&LiffSettings {
        points_id: "1000-points".to_string(),
        default_id: "1000-default".to_string(),
        ..LiffSettings::default()
    }));
    AppState {
        sessions,
        routing,
        secure_cookies: false,
    }
}

// Mirrors the binary's router assembly.
fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/auth/login",
            get(handlers::login_page).post(handlers::login),
        )
        .route("/auth/session", get(handlers::current_session))
        .route("/auth/session/liff", post(handlers::liff_exchange))
        .route("/auth/logout", post(handlers::logout))
        .fallback(handlers::app_page)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::route_gate,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

fn session_cookie_from(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    set_cookie.split(';').next().unwrap().to_string()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn liff_exchange_issues_a_session_cookie() {
    let app = app(state(true));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/session/liff")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"lineUserId":"U1","displayName":"Somchai","pictureUrl":"","accessToken":"tok"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie_from(&response);
    assert!(cookie.starts_with("mela_session="));

    let body = json_body(response).await;
    assert_eq!(body["user"]["loginType"], "liff");
    assert_eq!(body["user"]["lineUserId"], "U1");
    assert!(body["expires_at"].is_number());
}

#[tokio::test]
async fn session_read_refreshes_the_cookie() {
    let state = state(true);
    let app = app(state.clone());

    let exchange = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/session/liff")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"lineUserId":"U1","displayName":"Somchai"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let cookie = session_cookie_from(&exchange);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/session")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // Sliding expiry: a fresh cookie rides on the validated read.
    session_cookie_from(&response);
    let body = json_body(response).await;
    assert_eq!(body["user"]["id"], "U1");
}

#[tokio::test]
async fn session_read_without_cookie_is_unauthorized() {
    let app = app(state(true));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn require_liff_rejects_credentials_sessions() {
    let state = state(true);
    let issued = state
        .sessions
        .issue(&SessionUser::Credentials {
            id: "42".to_string(),
            name: "admin".to_string(),
            email: None,
        })
        .unwrap();
    let app = app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/session?require=liff")
                .header(header::COOKIE, format!("mela_session={}", issued.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_credentials_surface_only_the_generic_message() {
    let app = app(state(false));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=somchai&password=wrong"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "ชื่อผู้ใช้หรือรหัสผ่านไม่ถูกต้อง");
}

#[tokio::test]
async fn credentials_login_redirects_to_the_callback() {
    let app = app(state(true));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "username=somchai&password=right&callbackUrl=%2Fdashboard",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );
    let cookie = session_cookie_from(&response);
    assert!(cookie.starts_with("mela_session="));
}

#[tokio::test]
async fn login_page_carries_the_callback() {
    let app = app(state(true));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login?callbackUrl=/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains(r#"name="callbackUrl" value="/dashboard""#));
}

#[tokio::test]
async fn logout_clears_the_cookie_and_lands_on_root() {
    let app = app(state(true));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("mela_session="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn every_response_carries_the_security_headers() {
    for uri in ["/health", "/points", "/auth/session"] {
        let app = app(state(true));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(
            headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        assert_eq!(
            headers.get(header::REFERRER_POLICY).unwrap(),
            "strict-origin-when-cross-origin"
        );
    }
}

#[tokio::test]
async fn health_reports_the_crate_version() {
    let app = app(state(true));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
