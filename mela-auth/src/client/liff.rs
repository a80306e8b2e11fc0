use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::common::LiffProfile;

const LINE_API_URL: &str = "https://api.line.me";
const LINE_LOGIN_URL: &str = "https://access.line.me/oauth2/v2.1/login";

#[derive(Debug, Error)]
pub enum LiffError {
    #[error("LIFF ID is required")]
    MissingLiffId,

    #[error("LIFF can only be initialized inside a host browser context")]
    NoHostContext,

    #[error("LIFF initialization failed: {0}")]
    Initialization(String),

    #[error("Failed to fetch LIFF profile: {0}")]
    ProfileFetch(#[source] reqwest::Error),

    #[error("Login is not permitted outside the LINE client")]
    LoginNotPermitted,
}

/// Capability surface of the in-app identity SDK.
///
/// `is_logged_in` and `is_in_client` are advisory probes and never fail;
/// implementations degrade internal errors to `false`.
pub trait IdentitySdk {
    /// Bind the SDK to a LIFF app. Idempotent for the same id on the same
    /// handle; a different id discards the previous state and re-initializes.
    fn initialize(&mut self, liff_id: &str) -> Result<(), LiffError>;

    fn is_logged_in(&self) -> bool;

    fn is_in_client(&self) -> bool;

    /// Profile of the logged-in user, or `None` if not logged in.
    fn profile(&self)
        -> impl Future<Output = Result<Option<LiffProfile>, LiffError>> + Send;

    fn access_token(&self) -> Option<String>;

    /// Start the provider-hosted login. Returns the URL the host client must
    /// navigate to; control does not come back to the caller until the
    /// provider redirects to `redirect_uri` and the page reloads.
    fn login(&mut self, redirect_uri: &str) -> Result<String, LiffError>;

    /// Clear the provider-side session. No-op if not logged in.
    fn logout(&mut self);
}

/// Handle to the embedding browser environment. None of these values can be
/// produced server-side; holding one asserts a live page context.
#[derive(Debug, Clone)]
pub struct HostContext {
    /// Absolute URL of the page currently hosting the bootstrap.
    pub current_url: String,
    /// True when embedded in the LINE app's in-app browser.
    pub in_line_client: bool,
    /// Provider access token handed over by the host after a completed
    /// provider login, if any.
    pub access_token: Option<String>,
}

#[derive(Debug)]
struct SdkState {
    liff_id: String,
    access_token: Option<String>,
}

/// Production adapter over LINE's LIFF surface: token hand-off from the host
/// context plus the profile endpoint of the LINE platform API.
pub struct LineLiffSdk {
    http: reqwest::Client,
    api_url: String,
    host: Option<HostContext>,
    with_login_on_external_browser: bool,
    state: Option<SdkState>,
}

impl LineLiffSdk {
    pub fn new(host: Option<HostContext>) -> Self {
        Self::with_api_url(host, LINE_API_URL)
    }

    pub fn with_api_url(host: Option<HostContext>, api_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_url: api_url.into(),
            host,
            with_login_on_external_browser: true,
            state: None,
        }
    }

    /// Disallow provider login from outside the LINE client.
    pub fn require_line_client(mut self) -> Self {
        self.with_login_on_external_browser = false;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfile {
    user_id: String,
    display_name: String,
    #[serde(default)]
    picture_url: Option<String>,
    #[serde(default)]
    status_message: Option<String>,
}

impl IdentitySdk for LineLiffSdk {
    fn initialize(&mut self, liff_id: &str) -> Result<(), LiffError> {
        if liff_id.is_empty() {
            return Err(LiffError::MissingLiffId);
        }
        let host = self.host.as_ref().ok_or(LiffError::NoHostContext)?;

        if let Some(state) = &self.state {
            if state.liff_id == liff_id {
                return Ok(());
            }
        }

        // A different id discards the previous handle entirely.
        self.state = Some(SdkState {
            liff_id: liff_id.to_string(),
            access_token: host.access_token.clone(),
        });
        Ok(())
    }

    fn is_logged_in(&self) -> bool {
        self.state
            .as_ref()
            .map(|s| s.access_token.is_some())
            .unwrap_or(false)
    }

    fn is_in_client(&self) -> bool {
        self.host.as_ref().map(|h| h.in_line_client).unwrap_or(false)
    }

    async fn profile(&self) -> Result<Option<LiffProfile>, LiffError> {
        let token = match self.state.as_ref().and_then(|s| s.access_token.as_deref()) {
            Some(token) => token,
            None => return Ok(None),
        };

        let raw: RawProfile = self
            .http
            .get(format!("{}/v2/profile", self.api_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(LiffError::ProfileFetch)?
            .error_for_status()
            .map_err(LiffError::ProfileFetch)?
            .json()
            .await
            .map_err(LiffError::ProfileFetch)?;

        Ok(Some(LiffProfile {
            user_id: raw.user_id,
            display_name: raw.display_name,
            picture_url: raw.picture_url,
            status_message: raw.status_message,
        }))
    }

    fn access_token(&self) -> Option<String> {
        self.state.as_ref().and_then(|s| s.access_token.clone())
    }

    fn login(&mut self, redirect_uri: &str) -> Result<String, LiffError> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| LiffError::Initialization("login before initialize".to_string()))?;

        // Already logged in: nothing to hand to the provider.
        if state.access_token.is_some() {
            return Ok(redirect_uri.to_string());
        }

        if !self.is_in_client() && !self.with_login_on_external_browser {
            return Err(LiffError::LoginNotPermitted);
        }

        let return_uri: String =
            url::form_urlencoded::byte_serialize(redirect_uri.as_bytes()).collect();
        Ok(format!(
            "{}?liffId={}&returnUri={}",
            LINE_LOGIN_URL, state.liff_id, return_uri
        ))
    }

    fn logout(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.access_token = None;
        }
    }
}
