use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PREDICT_URL: &str = "https://majeed786-spot-violation.hf.space/api/predict";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_env: String,
    pub port: u16,
    pub log_level: String,
    pub inference_strategy: String,
    pub inference_predict_url: String,
    pub inference_detect_url: String,
    pub inference_timeout_ms: u64,
    pub media_fetch_max_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceStrategyKind {
    MultiProbe,
    SingleProbe,
}

#[derive(Debug, Error)]
#[error("unknown inference strategy {0:?}; expected multi_probe or single_probe")]
pub struct UnknownStrategy(pub String);

impl InferenceStrategyKind {
    pub fn parse(value: &str) -> Result<Self, UnknownStrategy> {
        match value.trim().to_ascii_lowercase().as_str() {
            "multi_probe" => Ok(Self::MultiProbe),
            "single_probe" => Ok(Self::SingleProbe),
            _ => Err(UnknownStrategy(value.to_string())),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let cfg = config::Config::builder()
            .set_default("app_env", "development")?
            .set_default("port", 3000)?
            .set_default("log_level", "info")?
            .set_default("inference_strategy", "multi_probe")?
            .set_default("inference_predict_url", DEFAULT_PREDICT_URL)?
            .set_default("inference_detect_url", "http://127.0.0.1:7860/detect")?
            .set_default("inference_timeout_ms", 8000)?
            .set_default("media_fetch_max_bytes", 20 * 1024 * 1024)?
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn strategy_kind(&self) -> Result<InferenceStrategyKind, UnknownStrategy> {
        InferenceStrategyKind::parse(&self.inference_strategy)
    }
}
