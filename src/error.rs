use reqwest::StatusCode;

/// Failure to complete a request against the remote session or to decode its reply.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("session responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid session payload: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
