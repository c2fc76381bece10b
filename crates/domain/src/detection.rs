use serde::Serialize;

use crate::DomainResult;
use crate::error::DomainError;

pub const INFERENCE_CONFIDENCE: f64 = 0.9;
pub const FALLBACK_CONFIDENCE: f64 = 0.85;
pub const AUTO_VERIFY_THRESHOLD: f64 = 0.8;

pub const MEDIA_URL_REQUIRED: &str = "Media URL is required";
const MESSAGE_DETECTED: &str = "Violations detected";
const MESSAGE_NONE: &str = "No violations detected";

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
pub enum ViolationCategory {
    #[serde(rename = "No Helmet")]
    NoHelmet,
    #[serde(rename = "Triple Riding")]
    TripleRiding,
    #[serde(rename = "Wrong Side")]
    WrongSide,
    #[serde(rename = "Pothole")]
    Pothole,
}

impl ViolationCategory {
    /// Draw order used by the fallback simulator.
    pub const ALL: [ViolationCategory; 4] = [
        Self::TripleRiding,
        Self::NoHelmet,
        Self::WrongSide,
        Self::Pothole,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoHelmet => "No Helmet",
            Self::TripleRiding => "Triple Riding",
            Self::WrongSide => "Wrong Side",
            Self::Pothole => "Pothole",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectionRequest {
    pub media_reference: String,
    pub media_kind: MediaKind,
}

impl DetectionRequest {
    /// Collapses the caller's image/video pair into one reference. The image
    /// wins when both are present; blank strings count as absent.
    pub fn from_media_urls(
        image_url: Option<&str>,
        video_url: Option<&str>,
    ) -> DomainResult<Self> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.filter(|url| !url.is_empty())
        }

        if let Some(url) = present(image_url) {
            return Ok(Self {
                media_reference: url.to_string(),
                media_kind: MediaKind::Image,
            });
        }
        if let Some(url) = present(video_url) {
            return Ok(Self {
                media_reference: url.to_string(),
                media_kind: MediaKind::Video,
            });
        }
        Err(DomainError::Validation(MEDIA_URL_REQUIRED.to_string()))
    }
}

/// Insertion-ordered set of categories.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViolationSet(Vec<ViolationCategory>);

impl ViolationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the category was already present.
    pub fn insert(&mut self, category: ViolationCategory) -> bool {
        if self.0.contains(&category) {
            return false;
        }
        self.0.push(category);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViolationCategory> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ViolationCategory] {
        &self.0
    }
}

impl FromIterator<ViolationCategory> for ViolationSet {
    fn from_iter<I: IntoIterator<Item = ViolationCategory>>(iter: I) -> Self {
        let mut set = Self::new();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionOutcome {
    pub detected_violations: ViolationSet,
    pub confidence: f64,
    pub should_auto_verify: bool,
    pub message: String,
}

impl DetectionOutcome {
    /// `detected_confidence` applies only when at least one violation was
    /// found; an empty set always scores zero.
    pub fn from_violations(violations: ViolationSet, detected_confidence: f64) -> Self {
        let confidence = if violations.is_empty() {
            0.0
        } else {
            detected_confidence
        };
        let message = if violations.is_empty() {
            MESSAGE_NONE
        } else {
            MESSAGE_DETECTED
        };
        Self {
            detected_violations: violations,
            confidence,
            should_auto_verify: confidence > AUTO_VERIFY_THRESHOLD,
            message: message.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionSource {
    Inference,
    Fallback,
}

impl DetectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inference => "inference",
            Self::Fallback => "fallback",
        }
    }
}

/// What the orchestrator hands back to the gateway. Only `outcome` is ever
/// shown to callers.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub outcome: DetectionOutcome,
    pub source: DetectionSource,
    pub strategy: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_reference_wins_over_video() {
        let request =
            DetectionRequest::from_media_urls(Some("https://a/img.jpg"), Some("https://a/v.mp4"))
                .unwrap();
        assert_eq!(request.media_kind, MediaKind::Image);
        assert_eq!(request.media_reference, "https://a/img.jpg");
    }

    #[test]
    fn blank_image_falls_through_to_video() {
        let request = DetectionRequest::from_media_urls(Some(""), Some("https://a/v.mp4")).unwrap();
        assert_eq!(request.media_kind, MediaKind::Video);
    }

    #[test]
    fn owned_inputs_are_borrowed_for_selection() {
        let image_url: Option<String> = Some(String::new());
        let video_url: Option<String> = Some("https://a/clip.mp4".to_string());
        let request =
            DetectionRequest::from_media_urls(image_url.as_deref(), video_url.as_deref()).unwrap();
        drop(image_url);
        drop(video_url);
        assert_eq!(request.media_kind, MediaKind::Video);
        assert_eq!(request.media_reference, "https://a/clip.mp4");
    }

    #[test]
    fn missing_media_is_a_validation_error() {
        let err = DetectionRequest::from_media_urls(None, Some("")).unwrap_err();
        assert_eq!(err.to_string(), "validation failed: Media URL is required");
    }

    #[test]
    fn violation_set_ignores_duplicates() {
        let set: ViolationSet = [
            ViolationCategory::Pothole,
            ViolationCategory::NoHelmet,
            ViolationCategory::Pothole,
        ]
        .into_iter()
        .collect();
        assert_eq!(
            set.as_slice(),
            &[ViolationCategory::Pothole, ViolationCategory::NoHelmet]
        );
    }

    #[test]
    fn empty_set_scores_zero_and_never_auto_verifies() {
        let outcome = DetectionOutcome::from_violations(ViolationSet::new(), INFERENCE_CONFIDENCE);
        assert_eq!(outcome.confidence, 0.0);
        assert!(!outcome.should_auto_verify);
        assert_eq!(outcome.message, "No violations detected");
    }

    #[test]
    fn fallback_confidence_still_clears_auto_verify_threshold() {
        let set: ViolationSet = [ViolationCategory::WrongSide].into_iter().collect();
        let outcome = DetectionOutcome::from_violations(set, FALLBACK_CONFIDENCE);
        assert_eq!(outcome.confidence, 0.85);
        assert!(outcome.should_auto_verify);
        assert_eq!(outcome.message, "Violations detected");
    }

    #[test]
    fn outcome_serializes_with_wire_names() {
        let set: ViolationSet = [ViolationCategory::TripleRiding, ViolationCategory::Pothole]
            .into_iter()
            .collect();
        let outcome = DetectionOutcome::from_violations(set, INFERENCE_CONFIDENCE);
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "detectedViolations": ["Triple Riding", "Pothole"],
                "confidence": 0.9,
                "shouldAutoVerify": true,
                "message": "Violations detected"
            })
        );
    }
}
