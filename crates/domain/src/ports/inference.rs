use serde_json::Value;

use crate::detection::DetectionRequest;
use crate::error::RemoteError;
use crate::normalize::TaskType;
use crate::ports::BoxFuture;

/// Raw result of one outbound call. Consumed immediately by a normalizer.
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeResult {
    Success(Value),
    HttpError { status: u16, body: String },
    TransportError(String),
}

impl ProbeResult {
    pub fn into_payload(self) -> Result<Value, RemoteError> {
        match self {
            ProbeResult::Success(value) => Ok(value),
            ProbeResult::HttpError { status, body } => Err(RemoteError::Http { status, body }),
            ProbeResult::TransportError(cause) => Err(RemoteError::Transport(cause)),
        }
    }
}

/// One call per task label, carrying the media reference.
pub trait TaskProbe: Send + Sync {
    fn probe_task(&self, request: &DetectionRequest, task: TaskType) -> BoxFuture<'_, ProbeResult>;
}

/// One call carrying the media content itself, answered with per-category
/// flags.
pub trait FlagProbe: Send + Sync {
    fn probe_flags(&self, request: &DetectionRequest) -> BoxFuture<'_, ProbeResult>;
}
