use chrono::{serde::ts_seconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::SessionUser;

// GET /auth/login
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPageQuery {
    #[serde(default)]
    pub callback_url: Option<String>,
}

// POST /auth/login
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub callback_url: Option<String>,
}

// POST /auth/session/liff
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiffExchangeRequest {
    pub line_user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

// GET /auth/session
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub require: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: SessionUser,
    #[serde(with = "ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

// Health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
