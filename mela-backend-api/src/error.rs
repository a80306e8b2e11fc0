use tower_api_client::{Error as ApiError, StatusCode};

#[derive(Debug)]
pub enum BackendApiError {
    Backend(StatusCode, String),
    Internal(ApiError),
}

impl From<ApiError> for BackendApiError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::ClientError(status, detail) | ApiError::ServerError(status, detail) => {
                BackendApiError::Backend(status, detail)
            }
            e => BackendApiError::Internal(e),
        }
    }
}

impl std::fmt::Display for BackendApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendApiError::Internal(e) => write!(f, "Internal error: {}", e),
            BackendApiError::Backend(status, detail) => {
                write!(f, "({}) {}", status, detail)
            }
        }
    }
}

impl std::error::Error for BackendApiError {}

impl BackendApiError {
    /// True for definitive rejections (4xx), false for transport or server
    /// trouble where the caller may want to retry.
    pub fn is_rejection(&self) -> bool {
        matches!(self, BackendApiError::Backend(status, _) if status.is_client_error())
    }
}
