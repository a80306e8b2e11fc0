use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::common::LiffRouting;
use crate::server::cookies::{self, SESSION_COOKIE_NAME};
use crate::server::AppState;

const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/admin"];

/// Coarse request classification. Only `Protected` paths are acted on here:
/// LIFF paths pass through because the provider bootstrap has to run in the
/// page itself, and API/auth routes guard themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Api,
    Auth,
    Liff,
    Protected,
    Public,
}

impl RouteClass {
    pub fn classify(path: &str, routing: &LiffRouting) -> Self {
        if path.starts_with("/api") {
            return RouteClass::Api;
        }
        if path.starts_with("/auth") {
            return RouteClass::Auth;
        }
        if routing.requires_bootstrap(path) {
            return RouteClass::Liff;
        }
        if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
            return RouteClass::Protected;
        }
        RouteClass::Public
    }
}

/// Redirect target for an unauthenticated request to a protected path.
pub fn login_redirect(path: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("/auth/login?callbackUrl={}", encoded)
}

pub async fn route_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    if RouteClass::classify(&path, &state.routing) != RouteClass::Protected {
        return next.run(req).await;
    }

    let user = jar
        .get(SESSION_COOKIE_NAME)
        .and_then(|cookie| state.sessions.verify(cookie.value()).ok());

    let user = match user {
        Some(user) => user,
        None => {
            tracing::debug!(%path, "Unauthenticated request to protected path");
            return Redirect::to(&login_redirect(&path)).into_response();
        }
    };

    let mut response = next.run(req).await;

    // Sliding expiry: every validated request re-issues the cookie with a
    // fresh 30-day window.
    if let Ok(issued) = state.sessions.issue(&user) {
        let cookie = cookies::session_cookie(
            &issued.token,
            state.sessions.max_age_days(),
            state.secure_cookies,
        );
        if let Ok(value) = cookie.to_string().parse() {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{LiffRouting, LiffSettings};
    use crate::server::services::backend::{AuthBackend, BackendError, BackendUser};
    use crate::server::services::SessionService;
    use crate::server::AppState;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    struct NoBackend;

    #[async_trait::async_trait]
    impl AuthBackend for NoBackend {
        async fn login(&self, _: &str, _: &str) -> Result<BackendUser, BackendError> {
            Err(BackendError::Unavailable("not wired in tests".to_string()))
        }

        async fn verify_liff(&self, _: &str, _: &str) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn state() -> AppState {
        let sessions = Arc::new(SessionService::new(
            Arc::new(NoBackend),
            "test-secret",
            30,
            false,
        ));
        let routing = Arc::new(LiffRouting::from_settings(&LiffSettings {
            points_id: "1000-points".to_string(),
            ..LiffSettings::default()
        }));
        AppState {
            sessions,
            routing,
            secure_cookies: false,
        }
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .fallback(get(|| async { "page" }))
            .layer(middleware::from_fn_with_state(state.clone(), route_gate))
            .with_state(state)
    }

    fn routing() -> LiffRouting {
        LiffRouting::from_settings(&LiffSettings {
            points_id: "1000-points".to_string(),
            ..LiffSettings::default()
        })
    }

    #[test]
    fn classification_covers_the_surface() {
        let routing = routing();
        assert_eq!(RouteClass::classify("/api/points", &routing), RouteClass::Api);
        assert_eq!(RouteClass::classify("/auth/login", &routing), RouteClass::Auth);
        assert_eq!(RouteClass::classify("/points", &routing), RouteClass::Liff);
        assert_eq!(
            RouteClass::classify("/dashboard/stats", &routing),
            RouteClass::Protected
        );
        assert_eq!(RouteClass::classify("/admin", &routing), RouteClass::Protected);
        assert_eq!(RouteClass::classify("/", &routing), RouteClass::Public);
    }

    #[tokio::test]
    async fn dashboard_without_session_redirects_to_login() {
        let app = app(state());

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/dashboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "/auth/login?callbackUrl=%2Fdashboard");
    }

    #[tokio::test]
    async fn dashboard_with_valid_session_passes_and_refreshes_the_cookie() {
        let state = state();
        let issued = state
            .sessions
            .issue(&crate::common::SessionUser::Credentials {
                id: "42".to_string(),
                name: "admin".to_string(),
                email: None,
            })
            .unwrap();
        let app = app(state);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/dashboard")
                    .header(
                        header::COOKIE,
                        format!("{}={}", SESSION_COOKIE_NAME, issued.token),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(set_cookie
            .to_str()
            .unwrap()
            .starts_with(SESSION_COOKIE_NAME));
    }

    #[tokio::test]
    async fn liff_and_public_paths_pass_without_a_session() {
        for path in ["/points", "/"] {
            let app = app(state());
            let response = app
                .oneshot(
                    axum::http::Request::builder()
                        .uri(path)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "path {}", path);
        }
    }

    #[tokio::test]
    async fn tampered_session_is_redirected() {
        let app = app(state());

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/admin")
                    .header(
                        header::COOKIE,
                        format!("{}=not-a-real-token", SESSION_COOKIE_NAME),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
