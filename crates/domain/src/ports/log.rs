/// Diagnostic sink for the detection pipeline. Nothing written here is part
/// of the response contract.
pub trait DetectionLog: Send + Sync {
    fn info(&self, event: &str, detail: &str);

    fn error(&self, event: &str, detail: &str);
}

/// Drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDetectionLog;

impl DetectionLog for NoopDetectionLog {
    fn info(&self, _event: &str, _detail: &str) {}

    fn error(&self, _event: &str, _detail: &str) {}
}
