use spot_domain::service::DetectionService;
use spot_infra::config::AppConfig;
use spot_infra::inference_client::detection_service_from_config;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub detection: DetectionService,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let detection = detection_service_from_config(&config)?;
        Ok(Self { config, detection })
    }
}
