use serde::{Deserialize, Serialize};

/// Profile returned by a successful identity-provider login. Discarded on
/// logout; never stored server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiffProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

/// Authenticated principal carried by the application session.
///
/// The login kind is the serde tag, so a `liff` session cannot exist without
/// its `lineUserId` and a `credentials` session cannot carry one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "loginType", rename_all = "camelCase")]
pub enum SessionUser {
    #[serde(rename_all = "camelCase")]
    Credentials {
        id: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Liff {
        id: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        picture_url: Option<String>,
        line_user_id: String,
    },
}

impl SessionUser {
    pub fn id(&self) -> &str {
        match self {
            SessionUser::Credentials { id, .. } | SessionUser::Liff { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SessionUser::Credentials { name, .. } | SessionUser::Liff { name, .. } => name,
        }
    }

    /// LINE user id, present exactly for `liff` sessions.
    pub fn line_user_id(&self) -> Option<&str> {
        match self {
            SessionUser::Liff { line_user_id, .. } => Some(line_user_id),
            SessionUser::Credentials { .. } => None,
        }
    }

    pub fn login_type(&self) -> &'static str {
        match self {
            SessionUser::Credentials { .. } => "credentials",
            SessionUser::Liff { .. } => "liff",
        }
    }

    pub fn is_liff(&self) -> bool {
        matches!(self, SessionUser::Liff { .. })
    }
}
