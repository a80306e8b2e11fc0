use chrono::{DateTime, Utc};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::common::{LiffProfile, SessionUser};

const SESSION_COOKIE: &str = "mela_session";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// LIFF credentials handed to the session server for exchange. Field names
/// mirror the server's wire contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiffExchange {
    pub line_user_id: String,
    pub display_name: String,
    pub picture_url: String,
    pub access_token: String,
}

impl LiffExchange {
    pub fn from_profile(profile: &LiffProfile, access_token: Option<String>) -> Self {
        Self {
            line_user_id: profile.user_id.clone(),
            display_name: profile.display_name.clone(),
            picture_url: profile.picture_url.clone().unwrap_or_default(),
            access_token: access_token.unwrap_or_default(),
        }
    }
}

/// Freshly issued application session.
#[derive(Debug, Clone)]
pub struct SessionEstablished {
    pub token: String,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum SessionClientError {
    Http(reqwest::Error),
    /// The server refused the exchange; carries its user-facing reason.
    Rejected(String),
    ServerError(String),
}

impl std::fmt::Display for SessionClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {}", e),
            Self::Rejected(msg) => write!(f, "{}", msg),
            Self::ServerError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for SessionClientError {}

impl From<reqwest::Error> for SessionClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

/// Session-issuing backend as seen by the bootstrap flow.
pub trait SessionExchanger {
    fn exchange_liff(
        &self,
        exchange: &LiffExchange,
    ) -> impl Future<Output = Result<SessionEstablished, SessionClientError>> + Send;
}

// Mirror server models
#[derive(Debug, Deserialize)]
struct SessionResponse {
    user: SessionUser,
    #[serde(with = "chrono::serde::ts_seconds")]
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct SessionClient {
    http: Client,
    server_url: String,
}

impl SessionClient {
    pub fn new(server_url: String) -> Self {
        // Redirects are never followed: the session cookie rides on the
        // redirect response itself.
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self { http, server_url }
    }

    pub async fn login_credentials(
        &self,
        username: &str,
        password: &str,
        callback_url: Option<&str>,
    ) -> Result<SessionEstablished, SessionClientError> {
        let url = format!("{}/auth/login", self.server_url);
        let mut form = vec![("username", username), ("password", password)];
        if let Some(callback_url) = callback_url {
            form.push(("callbackUrl", callback_url));
        }

        let resp = self.http.post(&url).form(&form).send().await?;
        // A successful login answers with a redirect to the callback URL.
        if !(resp.status().is_success() || resp.status().is_redirection()) {
            return Err(Self::rejection(resp).await);
        }

        let token = extract_session_cookie(resp.headers())
            .ok_or_else(|| SessionClientError::ServerError("Missing session cookie".into()))?;

        // The login route redirects; the session body comes from a follow-up
        // validated read.
        let session = self
            .current_session(&token)
            .await?
            .ok_or_else(|| SessionClientError::ServerError("Session not readable".into()))?;

        Ok(SessionEstablished {
            token,
            user: session.user,
            expires_at: session.expires_at,
        })
    }

    /// Validated read of the current session; `None` when the server no
    /// longer accepts the token.
    pub async fn current_session(
        &self,
        token: &str,
    ) -> Result<Option<SessionResponseView>, SessionClientError> {
        let url = format!("{}/auth/session", self.server_url);
        let resp = self
            .http
            .get(&url)
            .header(COOKIE, format!("{}={}", SESSION_COOKIE, token))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::rejection(resp).await);
        }

        let body: SessionResponse = resp.json().await?;
        Ok(Some(SessionResponseView {
            user: body.user,
            expires_at: body.expires_at,
        }))
    }

    pub async fn logout(&self, token: &str) -> Result<(), SessionClientError> {
        let url = format!("{}/auth/logout", self.server_url);
        self.http
            .post(&url)
            .header(COOKIE, format!("{}={}", SESSION_COOKIE, token))
            .send()
            .await?;
        Ok(())
    }

    async fn rejection(resp: reqwest::Response) -> SessionClientError {
        let reason = resp
            .json::<ErrorBody>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| "Authentication failed".to_string());
        SessionClientError::Rejected(reason)
    }
}

/// Current session as reported by the server.
#[derive(Debug, Clone)]
pub struct SessionResponseView {
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

impl SessionExchanger for SessionClient {
    async fn exchange_liff(
        &self,
        exchange: &LiffExchange,
    ) -> Result<SessionEstablished, SessionClientError> {
        let url = format!("{}/auth/session/liff", self.server_url);
        let resp = self.http.post(&url).json(exchange).send().await?;

        if !resp.status().is_success() {
            return Err(Self::rejection(resp).await);
        }

        let token = extract_session_cookie(resp.headers())
            .ok_or_else(|| SessionClientError::ServerError("Missing session cookie".into()))?;
        let body: SessionResponse = resp.json().await?;

        Ok(SessionEstablished {
            token,
            user: body.user,
            expires_at: body.expires_at,
        })
    }
}

fn extract_session_cookie(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers.get_all(SET_COOKIE).iter().find_map(|value| {
        let value = value.to_str().ok()?;
        let (name, rest) = value.split_once('=')?;
        if name.trim() != SESSION_COOKIE {
            return None;
        }
        let token = rest.split(';').next()?.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    })
}
