use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;
use spot_domain::detection::{DetectionOutcome, DetectionRequest};
use spot_domain::error::DomainError;

use crate::error::ApiError;
use crate::observability;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectViolationsRequest {
    image_url: Option<String>,
    video_url: Option<String>,
}

/// Non-object JSON bodies carry no media fields and fall through to
/// validation. `null` and unparseable bodies are internal errors.
fn parse_request(body: &[u8]) -> Result<DetectViolationsRequest, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| ApiError::Internal(err.to_string()))?;
    match value {
        Value::Object(_) => {
            serde_json::from_value(value).map_err(|err| ApiError::Internal(err.to_string()))
        }
        Value::Null => Err(ApiError::Internal(
            "request body is null; expected a JSON object".to_string(),
        )),
        _ => Ok(DetectViolationsRequest::default()),
    }
}

/// A body that is not valid JSON maps to a 500, not axum's JSON rejection.
pub(super) async fn detect_violations(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DetectionOutcome>, ApiError> {
    let payload = parse_request(&body)?;

    let request =
        DetectionRequest::from_media_urls(payload.image_url.as_deref(), payload.video_url.as_deref())
            .map_err(|err| match err {
                DomainError::Validation(message) => ApiError::Validation(message),
            })?;

    tracing::info!(
        media_url = %request.media_reference,
        media_kind = request.media_kind.as_str(),
        "processing media"
    );

    let detection = state.detection.detect(&request).await;
    observability::register_detection(&detection);
    tracing::info!(
        strategy = detection.strategy,
        source = detection.source.as_str(),
        violations = detection.outcome.detected_violations.len(),
        auto_verify = detection.outcome.should_auto_verify,
        "detection complete"
    );

    Ok(Json(detection.outcome))
}
