use std::sync::Arc;

use futures_util::future::join_all;

use crate::detection::{DetectionRequest, ViolationSet};
use crate::error::RemoteError;
use crate::normalize::{TaskType, match_task_payload, violations_from_flags};
use crate::ports::BoxFuture;
use crate::ports::inference::{FlagProbe, TaskProbe};
use crate::ports::log::DetectionLog;

pub const MULTI_PROBE: &str = "multi_probe";
pub const SINGLE_PROBE: &str = "single_probe";

/// One way of turning a media reference into canonical violations by asking
/// the remote inference service. An `Err` sends the orchestrator to the
/// fallback simulator.
pub trait InferenceStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn infer<'a>(
        &'a self,
        request: &'a DetectionRequest,
    ) -> BoxFuture<'a, Result<ViolationSet, RemoteError>>;
}

/// Fans out one call per [`TaskType`] and keyword-matches each answer.
/// A failed task only loses its own category.
#[derive(Clone)]
pub struct MultiProbeStrategy {
    probe: Arc<dyn TaskProbe>,
    log: Arc<dyn DetectionLog>,
}

impl MultiProbeStrategy {
    pub fn new(probe: Arc<dyn TaskProbe>, log: Arc<dyn DetectionLog>) -> Self {
        Self { probe, log }
    }
}

impl InferenceStrategy for MultiProbeStrategy {
    fn name(&self) -> &'static str {
        MULTI_PROBE
    }

    fn infer<'a>(
        &'a self,
        request: &'a DetectionRequest,
    ) -> BoxFuture<'a, Result<ViolationSet, RemoteError>> {
        Box::pin(async move {
            let probes = TaskType::ALL.into_iter().map(move |task| async move {
                self.log.info("task_probe_started", task.label());
                (task, self.probe.probe_task(request, task).await)
            });

            let mut violations = ViolationSet::new();
            for (task, result) in join_all(probes).await {
                match result.into_payload() {
                    Ok(payload) => {
                        if let Some(category) = match_task_payload(task, &payload) {
                            violations.insert(category);
                        }
                    }
                    Err(err) => {
                        self.log
                            .error("task_probe_failed", &format!("{}: {err}", task.label()));
                    }
                }
            }
            Ok(violations)
        })
    }
}

/// Uploads the media once and reads back one boolean flag per category.
/// Any failure is terminal for the strategy.
#[derive(Clone)]
pub struct SingleProbeStrategy {
    probe: Arc<dyn FlagProbe>,
}

impl SingleProbeStrategy {
    pub fn new(probe: Arc<dyn FlagProbe>) -> Self {
        Self { probe }
    }
}

impl InferenceStrategy for SingleProbeStrategy {
    fn name(&self) -> &'static str {
        SINGLE_PROBE
    }

    fn infer<'a>(
        &'a self,
        request: &'a DetectionRequest,
    ) -> BoxFuture<'a, Result<ViolationSet, RemoteError>> {
        Box::pin(async move {
            let payload = self.probe.probe_flags(request).await.into_payload()?;
            violations_from_flags(&payload)
        })
    }
}
