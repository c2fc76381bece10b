use std::sync::Arc;

use crate::detection::{
    Detection, DetectionOutcome, DetectionRequest, DetectionSource, INFERENCE_CONFIDENCE,
};
use crate::fallback::FallbackSimulator;
use crate::ports::log::DetectionLog;
use crate::strategy::InferenceStrategy;

/// Drives one request through the configured strategy. Remote failures are
/// absorbed here and replaced by a simulated outcome.
#[derive(Clone)]
pub struct DetectionService {
    strategy: Arc<dyn InferenceStrategy>,
    fallback: FallbackSimulator,
    log: Arc<dyn DetectionLog>,
}

impl DetectionService {
    pub fn new(
        strategy: Arc<dyn InferenceStrategy>,
        fallback: FallbackSimulator,
        log: Arc<dyn DetectionLog>,
    ) -> Self {
        Self {
            strategy,
            fallback,
            log,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub async fn detect(&self, request: &DetectionRequest) -> Detection {
        let strategy = self.strategy.name();
        self.log.info(
            "inference_started",
            &format!("{} via {strategy}", request.media_kind.as_str()),
        );

        match self.strategy.infer(request).await {
            Ok(violations) => Detection {
                outcome: DetectionOutcome::from_violations(violations, INFERENCE_CONFIDENCE),
                source: DetectionSource::Inference,
                strategy,
            },
            Err(err) => {
                self.log.error("inference_failed", &err.to_string());
                self.log
                    .info("fallback_simulation", "inference unavailable; simulating");
                Detection {
                    outcome: self.fallback.simulate(request.media_kind),
                    source: DetectionSource::Fallback,
                    strategy,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{MediaKind, ViolationCategory, ViolationSet};
    use crate::error::RemoteError;
    use crate::ports::BoxFuture;
    use crate::ports::log::NoopDetectionLog;
    use crate::ports::random::RandomSource;
    use std::sync::Mutex;

    struct FixedStrategy(Result<ViolationSet, RemoteError>);

    impl InferenceStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn infer<'a>(
            &'a self,
            _request: &'a DetectionRequest,
        ) -> BoxFuture<'a, Result<ViolationSet, RemoteError>> {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    struct ConstRandom(usize);

    impl RandomSource for ConstRandom {
        fn below(&self, _upper: usize) -> usize {
            self.0
        }
    }

    #[derive(Default)]
    struct RecordingLog {
        entries: Mutex<Vec<(&'static str, String, String)>>,
    }

    impl DetectionLog for RecordingLog {
        fn info(&self, event: &str, detail: &str) {
            self.entries
                .lock()
                .unwrap()
                .push(("info", event.to_string(), detail.to_string()));
        }

        fn error(&self, event: &str, detail: &str) {
            self.entries
                .lock()
                .unwrap()
                .push(("error", event.to_string(), detail.to_string()));
        }
    }

    fn request() -> DetectionRequest {
        DetectionRequest {
            media_reference: "https://cdn.example/clip.mp4".to_string(),
            media_kind: MediaKind::Video,
        }
    }

    #[tokio::test]
    async fn inference_result_uses_inference_confidence() {
        let violations: ViolationSet = [ViolationCategory::NoHelmet].into_iter().collect();
        let service = DetectionService::new(
            Arc::new(FixedStrategy(Ok(violations))),
            FallbackSimulator::new(Arc::new(ConstRandom(0))),
            Arc::new(NoopDetectionLog),
        );

        let detection = service.detect(&request()).await;
        assert_eq!(detection.source, DetectionSource::Inference);
        assert_eq!(detection.strategy, "fixed");
        assert_eq!(detection.outcome.confidence, 0.9);
        assert!(detection.outcome.should_auto_verify);
    }

    #[tokio::test]
    async fn empty_inference_result_is_not_replaced_by_fallback() {
        let service = DetectionService::new(
            Arc::new(FixedStrategy(Ok(ViolationSet::new()))),
            FallbackSimulator::new(Arc::new(ConstRandom(1))),
            Arc::new(NoopDetectionLog),
        );

        let detection = service.detect(&request()).await;
        assert_eq!(detection.source, DetectionSource::Inference);
        assert!(detection.outcome.detected_violations.is_empty());
        assert_eq!(detection.outcome.message, "No violations detected");
    }

    #[tokio::test]
    async fn remote_error_falls_back_and_is_logged() {
        let log = Arc::new(RecordingLog::default());
        let service = DetectionService::new(
            Arc::new(FixedStrategy(Err(RemoteError::Transport(
                "operation timed out".to_string(),
            )))),
            FallbackSimulator::new(Arc::new(ConstRandom(1))),
            log.clone(),
        );

        let detection = service.detect(&request()).await;
        assert_eq!(detection.source, DetectionSource::Fallback);
        assert_eq!(
            detection.outcome.detected_violations.as_slice(),
            &[ViolationCategory::NoHelmet]
        );
        assert_eq!(detection.outcome.confidence, 0.85);
        assert!(detection.outcome.should_auto_verify);

        let entries = log.entries.lock().unwrap();
        assert!(entries.iter().any(|(level, event, detail)| {
            *level == "error" && event == "inference_failed" && detail.contains("timed out")
        }));
    }
}
