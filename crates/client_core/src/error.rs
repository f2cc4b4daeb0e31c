use thiserror::Error;

/// Client-side failure taxonomy.
///
/// `Validation` is raised before any network call and is meant for inline
/// display next to the offending form fields. `Unauthorized` is produced by
/// the central gateway only, after the session has already been cleared.
/// Everything else is a per-call failure; callers keep their request state
/// and may retry explicitly, the client never retries on its own.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("session is missing or expired; log in again")]
    Unauthorized,
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("http transport failure: {0}")]
    Http(#[from] reqwest::Error),
    #[error("session store failure: {0}")]
    Store(#[source] anyhow::Error),
}

impl ClientError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Api { .. } | ClientError::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
