use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use spot_domain::detection::{DetectionRequest, MediaKind};
use spot_domain::fallback::FallbackSimulator;
use spot_domain::normalize::TaskType;
use spot_domain::ports::BoxFuture;
use spot_domain::ports::inference::{FlagProbe, ProbeResult, TaskProbe};
use spot_domain::ports::log::DetectionLog;
use spot_domain::service::DetectionService;
use spot_domain::strategy::{InferenceStrategy, MultiProbeStrategy, SingleProbeStrategy};

use crate::config::{AppConfig, InferenceStrategyKind, UnknownStrategy};
use crate::logging::TracingDetectionLog;

const FORM_FIELD_DATA: &str = "data";
const FORM_FIELD_FILE: &str = "file";

/// HTTP client for the remote inference service. Implements both probe
/// ports; which one is used depends on the configured strategy.
#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    http: reqwest::Client,
    predict_url: String,
    detect_url: String,
    media_fetch_max_bytes: usize,
}

impl HttpInferenceClient {
    pub fn from_config(config: &AppConfig) -> Self {
        let timeout = Duration::from_millis(config.inference_timeout_ms.max(1));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            predict_url: config.inference_predict_url.trim().to_string(),
            detect_url: config.inference_detect_url.trim().to_string(),
            media_fetch_max_bytes: config.media_fetch_max_bytes.max(1),
        }
    }

    async fn send_task(&self, media_reference: String, task: TaskType) -> ProbeResult {
        let form = Form::new()
            .text(FORM_FIELD_DATA, media_reference)
            .text(FORM_FIELD_DATA, task.label());
        match self.http.post(&self.predict_url).multipart(form).send().await {
            Ok(response) => read_probe_response(response).await,
            Err(err) => ProbeResult::TransportError(err.to_string()),
        }
    }

    async fn send_flags(&self, request: DetectionRequest) -> ProbeResult {
        let media = match self.fetch_media(&request.media_reference).await {
            Ok(media) => media,
            Err(failure) => return failure,
        };
        let part = match Part::bytes(media)
            .file_name(upload_file_name(request.media_kind))
            .mime_str(upload_mime(request.media_kind))
        {
            Ok(part) => part,
            Err(err) => return ProbeResult::TransportError(err.to_string()),
        };
        let form = Form::new().part(FORM_FIELD_FILE, part);
        match self.http.post(&self.detect_url).multipart(form).send().await {
            Ok(response) => read_probe_response(response).await,
            Err(err) => ProbeResult::TransportError(err.to_string()),
        }
    }

    async fn fetch_media(&self, url: &str) -> Result<Vec<u8>, ProbeResult> {
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| ProbeResult::TransportError(format!("media fetch: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProbeResult::HttpError {
                status: status.as_u16(),
                body: format!("media fetch: {body}"),
            });
        }
        if let Some(length) = response.content_length()
            && length > self.media_fetch_max_bytes as u64
        {
            return Err(self.media_too_large());
        }

        // Chunked bodies carry no length up front; stop reading at the cap.
        let mut media = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| ProbeResult::TransportError(format!("media fetch: {err}")))?
        {
            if media.len() + chunk.len() > self.media_fetch_max_bytes {
                return Err(self.media_too_large());
            }
            media.extend_from_slice(&chunk);
        }
        Ok(media)
    }

    fn media_too_large(&self) -> ProbeResult {
        ProbeResult::TransportError(format!(
            "media fetch: body exceeds {} bytes",
            self.media_fetch_max_bytes
        ))
    }
}

impl TaskProbe for HttpInferenceClient {
    fn probe_task(&self, request: &DetectionRequest, task: TaskType) -> BoxFuture<'_, ProbeResult> {
        let media_reference = request.media_reference.clone();
        Box::pin(self.send_task(media_reference, task))
    }
}

impl FlagProbe for HttpInferenceClient {
    fn probe_flags(&self, request: &DetectionRequest) -> BoxFuture<'_, ProbeResult> {
        Box::pin(self.send_flags(request.clone()))
    }
}

async fn read_probe_response(response: reqwest::Response) -> ProbeResult {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return ProbeResult::HttpError {
            status: status.as_u16(),
            body,
        };
    }
    match response.json::<Value>().await {
        Ok(value) => ProbeResult::Success(value),
        Err(err) => ProbeResult::TransportError(format!("response decode: {err}")),
    }
}

fn upload_file_name(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "upload.jpg",
        MediaKind::Video => "upload.mp4",
    }
}

fn upload_mime(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image/jpeg",
        MediaKind::Video => "video/mp4",
    }
}

/// Wires the configured strategy, the HTTP client and the tracing sink into
/// a ready orchestrator.
pub fn detection_service_from_config(
    config: &AppConfig,
) -> Result<DetectionService, UnknownStrategy> {
    let client = Arc::new(HttpInferenceClient::from_config(config));
    let log: Arc<dyn DetectionLog> = Arc::new(TracingDetectionLog);
    let strategy: Arc<dyn InferenceStrategy> = match config.strategy_kind()? {
        InferenceStrategyKind::MultiProbe => Arc::new(MultiProbeStrategy::new(client, log.clone())),
        InferenceStrategyKind::SingleProbe => Arc::new(SingleProbeStrategy::new(client)),
    };
    Ok(DetectionService::new(strategy, FallbackSimulator::default(), log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves one GET with a chunked body and no `Content-Length`, returning
    /// how many body bytes were written before the peer went away.
    async fn spawn_chunked_media(chunk_size: usize, chunks: usize) -> (String, JoinHandle<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind media stub");
        let addr = listener.local_addr().expect("media stub addr");
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = socket.read(&mut buf).await.expect("read request");
                if read == 0 {
                    return 0;
                }
                request.extend_from_slice(&buf[..read]);
            }

            let head = "HTTP/1.1 200 OK\r\ncontent-type: image/jpeg\r\ntransfer-encoding: chunked\r\n\r\n";
            if socket.write_all(head.as_bytes()).await.is_err() {
                return 0;
            }
            let mut frame = format!("{chunk_size:x}\r\n").into_bytes();
            frame.extend(std::iter::repeat_n(0xAB_u8, chunk_size));
            frame.extend_from_slice(b"\r\n");
            let mut sent = 0;
            for _ in 0..chunks {
                if socket.write_all(&frame).await.is_err() {
                    return sent;
                }
                sent += chunk_size;
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
            sent
        });
        (format!("http://{addr}/media/report.jpg"), handle)
    }

    fn config(strategy: &str) -> AppConfig {
        AppConfig {
            app_env: "test".to_string(),
            port: 0,
            log_level: "info".to_string(),
            inference_strategy: strategy.to_string(),
            inference_predict_url: " http://127.0.0.1:9/api/predict ".to_string(),
            inference_detect_url: "http://127.0.0.1:9/detect".to_string(),
            inference_timeout_ms: 0,
            media_fetch_max_bytes: 0,
        }
    }

    #[test]
    fn client_normalizes_config_values() {
        let client = HttpInferenceClient::from_config(&config("multi_probe"));
        assert_eq!(client.predict_url, "http://127.0.0.1:9/api/predict");
        assert_eq!(client.media_fetch_max_bytes, 1);
    }

    #[test]
    fn upload_naming_follows_media_kind() {
        assert_eq!(upload_file_name(MediaKind::Video), "upload.mp4");
        assert_eq!(upload_mime(MediaKind::Image), "image/jpeg");
    }

    #[test]
    fn service_reports_configured_strategy() {
        let service = detection_service_from_config(&config("single_probe")).unwrap();
        assert_eq!(service.strategy_name(), "single_probe");
        assert!(detection_service_from_config(&config("guess")).is_err());
    }

    #[tokio::test]
    async fn chunked_media_within_cap_is_collected() {
        let client = HttpInferenceClient::from_config(&AppConfig {
            inference_timeout_ms: 5_000,
            media_fetch_max_bytes: 1024,
            ..config("single_probe")
        });
        let (url, server) = spawn_chunked_media(100, 3).await;

        let media = client.fetch_media(&url).await.expect("media");
        assert_eq!(media.len(), 300);
        assert_eq!(server.await.expect("media stub"), 300);
    }

    #[tokio::test]
    async fn chunked_media_over_cap_stops_reading_early() {
        let client = HttpInferenceClient::from_config(&AppConfig {
            inference_timeout_ms: 10_000,
            media_fetch_max_bytes: 1024,
            ..config("single_probe")
        });
        let chunk_size = 64 * 1024;
        let chunks = 1024;
        let (url, server) = spawn_chunked_media(chunk_size, chunks).await;

        let result = client.fetch_media(&url).await;
        drop(client);
        assert!(matches!(
            result,
            Err(ProbeResult::TransportError(ref message)) if message.contains("exceeds 1024 bytes")
        ));

        let sent = tokio::time::timeout(Duration::from_secs(10), server)
            .await
            .expect("media stub finished")
            .expect("media stub");
        assert!(
            sent < chunk_size * chunks,
            "server wrote the whole {sent} byte body"
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let client = HttpInferenceClient::from_config(&AppConfig {
            inference_timeout_ms: 500,
            ..config("multi_probe")
        });
        let request = DetectionRequest {
            media_reference: "https://cdn.example/report.jpg".to_string(),
            media_kind: MediaKind::Image,
        };
        let result = client.probe_task(&request, TaskType::Pothole).await;
        assert!(matches!(result, ProbeResult::TransportError(_)));
    }
}
