use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mela_auth::common::LiffRouting;
use mela_auth::server::{
    config::Configuration,
    gate, handlers,
    services::{ExternalBackend, SessionService},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();

    // Load configuration
    let configuration = Configuration::new()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize services
    let backend = Arc::new(ExternalBackend::new(&configuration.backend.base_url));
    let sessions = Arc::new(SessionService::new(
        backend,
        &configuration.session.secret,
        configuration.session.max_age_days,
        configuration.backend.verify_liff,
    ));
    let routing = Arc::new(LiffRouting::from_settings(&configuration.liff));

    let app_state = AppState {
        sessions,
        routing,
        secure_cookies: configuration.server.secure_cookies,
    };

    // Build router
    let app = Router::new()
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
            app_state.clone(),
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
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server
    let addr = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
