use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Failure talking to, or understanding, the remote inference service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("inference http error: status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("inference transport error: {0}")]
    Transport(String),
    #[error("inference response decode error: {0}")]
    MalformedPayload(String),
}
