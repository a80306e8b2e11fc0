use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::common::SessionUser;
use crate::server::services::backend::{AuthBackend, BackendError};

/// Authorization failures collapse to these generic user-facing strings;
/// the real cause is only ever logged server-side.
const INVALID_CREDENTIALS_MSG: &str = "ชื่อผู้ใช้หรือรหัสผ่านไม่ถูกต้อง";
const LIFF_REJECTED_MSG: &str = "ไม่สามารถยืนยันตัวตนผ่าน LINE ได้";

#[derive(Debug, Error, PartialEq)]
pub enum AuthorizeError {
    #[error("{}", INVALID_CREDENTIALS_MSG)]
    InvalidCredentials,

    #[error("{}", LIFF_REJECTED_MSG)]
    LiffRejected,
}

#[derive(Debug, Error)]
pub enum SessionTokenError {
    #[error("Invalid session token")]
    Invalid,

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Tagged authorization input: exactly one of the two supported credential
/// kinds.
#[derive(Debug)]
pub enum AuthorizeRequest {
    Credentials {
        username: String,
        password: String,
    },
    Liff {
        line_user_id: String,
        display_name: String,
        picture_url: Option<String>,
        access_token: Option<String>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    user: SessionUser,
    jti: String,
    iat: i64,
    exp: i64,
}

/// Freshly signed session token and its absolute expiry.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates the application's stateless signed sessions, and
/// authorizes both credential kinds against the backend.
pub struct SessionService {
    backend: Arc<dyn AuthBackend>,
    verify_liff: bool,
    max_age: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionService {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        secret: &str,
        max_age_days: i64,
        verify_liff: bool,
    ) -> Self {
        Self {
            backend,
            verify_liff,
            max_age: Duration::days(max_age_days),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn max_age_days(&self) -> i64 {
        self.max_age.num_days()
    }

    /// Authorize either credential kind into a session principal.
    pub async fn authorize(&self, request: AuthorizeRequest) -> Result<SessionUser, AuthorizeError> {
        match request {
            AuthorizeRequest::Credentials { username, password } => {
                if username.is_empty() || password.is_empty() {
                    return Err(AuthorizeError::InvalidCredentials);
                }

                let account =
                    self.backend
                        .login(&username, &password)
                        .await
                        .map_err(|e: BackendError| {
                            tracing::warn!(%username, error = %e, "Credentials login rejected");
                            AuthorizeError::InvalidCredentials
                        })?;

                Ok(SessionUser::Credentials {
                    id: account.id,
                    name: account.name,
                    email: account.email,
                })
            }
            AuthorizeRequest::Liff {
                line_user_id,
                display_name,
                picture_url,
                access_token,
            } => {
                if line_user_id.is_empty() {
                    return Err(AuthorizeError::LiffRejected);
                }

                if self.verify_liff {
                    let token = access_token.as_deref().unwrap_or_default();
                    self.backend
                        .verify_liff(&line_user_id, token)
                        .await
                        .map_err(|e| {
                            tracing::warn!(%line_user_id, error = %e, "LIFF token verification failed");
                            AuthorizeError::LiffRejected
                        })?;
                }

                Ok(SessionUser::Liff {
                    id: line_user_id.clone(),
                    name: display_name,
                    picture_url: picture_url.filter(|p| !p.is_empty()),
                    line_user_id,
                })
            }
        }
    }

    /// Sign a session token for the principal.
    pub fn issue(&self, user: &SessionUser) -> Result<IssuedSession, SessionTokenError> {
        let now = Utc::now();
        let expires_at = now + self.max_age;
        let claims = SessionClaims {
            sub: user.id().to_string(),
            user: user.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedSession { token, expires_at })
    }

    /// Check signature and expiry; returns the principal on success.
    pub fn verify(&self, token: &str) -> Result<SessionUser, SessionTokenError> {
        if token.trim().is_empty() {
            return Err(SessionTokenError::Invalid);
        }

        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims.user)
    }
}
