use crate::config::AppConfig;
use anyhow::Result;
use spot_domain::ports::log::DetectionLog;
use tracing_subscriber::{EnvFilter, fmt};

pub fn init_tracing(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_new(config.log_level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.is_production() {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_target(false)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    Ok(())
}

/// Forwards detection pipeline diagnostics to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDetectionLog;

impl DetectionLog for TracingDetectionLog {
    fn info(&self, event: &str, detail: &str) {
        tracing::info!(event, detail, "detection");
    }

    fn error(&self, event: &str, detail: &str) {
        tracing::error!(event, detail, "detection");
    }
}
