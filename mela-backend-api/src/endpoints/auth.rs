use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{EmptyResponse, Method, Request, RequestData};

// Requests

#[derive(Debug, Clone, Serialize)]
pub struct Login {
    username: String,
    password: String,
}

impl Login {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Request for Login {
    type Data = Self;
    type Response = LoginResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/login".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyLiffToken {
    line_user_id: String,
    access_token: String,
}

impl VerifyLiffToken {
    pub fn new(line_user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            line_user_id: line_user_id.into(),
            access_token: access_token.into(),
        }
    }
}

impl Request for VerifyLiffToken {
    type Data = Self;
    type Response = EmptyResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/liff/verify".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

// Responses

/// Account payload returned by `POST /auth/login`. The backend is
/// inconsistent about field names across deployments, so both spellings of
/// the id and name fields are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl LoginResponse {
    pub fn account_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.user_id.as_deref())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.username.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_prefers_id_over_user_id() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"id":"a1","userId":"a2","name":"Somchai"}"#).unwrap();
        assert_eq!(resp.account_id(), Some("a1"));
        assert_eq!(resp.display_name(), Some("Somchai"));
    }

    #[test]
    fn login_response_falls_back_to_alternate_fields() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"userId":"a2","username":"somchai","email":"s@x.th"}"#)
                .unwrap();
        assert_eq!(resp.account_id(), Some("a2"));
        assert_eq!(resp.display_name(), Some("somchai"));
        assert_eq!(resp.email.as_deref(), Some("s@x.th"));
    }

    #[test]
    fn verify_request_uses_camel_case_wire_names() {
        let req = VerifyLiffToken::new("U1", "tok");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["lineUserId"], "U1");
        assert_eq!(json["accessToken"], "tok");
    }
}
