use crate::endpoints::auth::{Login, VerifyLiffToken};

pub struct AuthRepository;

impl AuthRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn login(&self, username: impl Into<String>, password: impl Into<String>) -> Login {
        Login::new(username, password)
    }

    pub fn verify_liff(
        &self,
        line_user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> VerifyLiffToken {
        VerifyLiffToken::new(line_user_id, access_token)
    }
}

impl Default for AuthRepository {
    fn default() -> Self {
        Self::new()
    }
}
