use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::common::SessionUser;
use crate::error::AuthError;

const EXPIRY_BUFFER: Duration = Duration::minutes(5);

/// Application session as held by the page between loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSession {
    pub token: String,
    pub user: SessionUser,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

pub struct SessionCache {
    session_path: PathBuf,
}

impl SessionCache {
    pub fn new() -> Result<Self, AuthError> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| AuthError::Configuration("Could not find cache directory".to_string()))?
            .join("mela");
        Self::at(cache_dir)
    }

    pub fn at(cache_dir: PathBuf) -> Result<Self, AuthError> {
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).map_err(|e| {
                AuthError::SessionStorage(format!("Failed to create cache directory: {}", e))
            })?;
        }

        Ok(Self {
            session_path: cache_dir.join("session.json"),
        })
    }

    pub fn save(&self, session: &CachedSession) -> Result<(), AuthError> {
        let json = serde_json::to_string_pretty(session)?;

        fs::write(&self.session_path, json)
            .map_err(|e| AuthError::SessionStorage(format!("Failed to save session: {}", e)))?;

        // The token is a credential; keep it owner-readable only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.session_path)
                .map_err(|e| {
                    AuthError::SessionStorage(format!("Failed to get file permissions: {}", e))
                })?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.session_path, perms).map_err(|e| {
                AuthError::SessionStorage(format!("Failed to set file permissions: {}", e))
            })?;
        }

        Ok(())
    }

    pub fn load(&self) -> Result<Option<CachedSession>, AuthError> {
        if !self.session_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.session_path)
            .map_err(|e| AuthError::SessionStorage(format!("Failed to read session: {}", e)))?;

        let session: CachedSession = serde_json::from_str(&json)?;
        Ok(Some(session))
    }

    pub fn delete(&self) -> Result<(), AuthError> {
        if self.session_path.exists() {
            fs::remove_file(&self.session_path)
                .map_err(|e| AuthError::SessionStorage(format!("Failed to delete session: {}", e)))?;
        }
        Ok(())
    }

    pub fn is_expired(&self, session: &CachedSession) -> bool {
        // Treat sessions about to lapse as already gone.
        session.expires_at <= (Utc::now() + EXPIRY_BUFFER)
    }

    /// Existing valid session, if any. Corrupt or expired entries read as
    /// absent; the bootstrap will establish a fresh one.
    pub fn current(&self) -> Option<CachedSession> {
        self.load().ok().flatten().filter(|s| !self.is_expired(s))
    }
}
