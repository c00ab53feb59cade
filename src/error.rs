use crate::models::ApiError;

/// A component that needs a context value was rendered outside the provider.
#[derive(Debug, thiserror::Error)]
#[error("missing context: {0} was not provided by an ancestor")]
pub struct MissingContextError(pub &'static str);

/// Failures while streaming flow logs from the backend.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("invalid flow log url: {0}")]
    Url(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned status {status}")]
    Status { status: u16, body: String },
}

impl From<&StreamError> for ApiError {
    fn from(err: &StreamError) -> Self {
        match err {
            StreamError::Status { status, body } if !body.trim().is_empty() => ApiError {
                message: body.trim().to_string(),
                status: Some(*status),
            },
            StreamError::Status { status, .. } => ApiError {
                message: err.to_string(),
                status: Some(*status),
            },
            _ => ApiError::new(err.to_string()),
        }
    }
}
