use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use mela_backend_api::{BackendApiError, Client, Request};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("Backend request failed: {0}")]
    Unavailable(String),
}

/// Verified account as reported by the backend after a credentials login.
#[derive(Debug, Clone)]
pub struct BackendUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

/// Outbound authorization surface. Implemented over the real backend API
/// and by stubs in tests.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<BackendUser, BackendError>;

    async fn verify_liff(
        &self,
        line_user_id: &str,
        access_token: &str,
    ) -> Result<(), BackendError>;
}

pub struct ExternalBackend {
    client: Client,
}

impl ExternalBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(base_url),
        }
    }
}

#[async_trait]
impl AuthBackend for ExternalBackend {
    async fn login(&self, username: &str, password: &str) -> Result<BackendUser, BackendError> {
        let request = Request::auth().login(username, password);
        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.client.send(request))
            .await
            .map_err(|_| BackendError::Unavailable("Request timed out".to_string()))?
            .map_err(map_api_error)?;

        let id = response.account_id().ok_or_else(|| {
            BackendError::Rejected("Login response carried no account id".to_string())
        })?;
        let name = response.display_name().unwrap_or(id).to_string();

        Ok(BackendUser {
            id: id.to_string(),
            name,
            email: response.email.clone(),
        })
    }

    async fn verify_liff(
        &self,
        line_user_id: &str,
        access_token: &str,
    ) -> Result<(), BackendError> {
        let request = Request::auth().verify_liff(line_user_id, access_token);
        tokio::time::timeout(REQUEST_TIMEOUT, self.client.send(request))
            .await
            .map_err(|_| BackendError::Unavailable("Request timed out".to_string()))?
            .map_err(map_api_error)?;
        Ok(())
    }
}

fn map_api_error(e: BackendApiError) -> BackendError {
    if e.is_rejection() {
        BackendError::Rejected(e.to_string())
    } else {
        BackendError::Unavailable(e.to_string())
    }
}
