use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

const METHOD_NOT_ALLOWED: &str = "Method not allowed";
const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Validation(message) => ErrorBody {
                error: message,
                details: None,
            },
            ApiError::MethodNotAllowed => ErrorBody {
                error: METHOD_NOT_ALLOWED.to_string(),
                details: None,
            },
            ApiError::Internal(details) => {
                tracing::error!(error = %details, "request failed");
                ErrorBody {
                    error: INTERNAL_SERVER_ERROR.to_string(),
                    details: Some(details),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
