use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{FrameSource, Prediction};

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
pub const MAX_CONSECUTIVE_FAILURES: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("prediction request timed out")]
    Timeout,
    #[error("prediction request failed: {0}")]
    Network(reqwest::Error),
    #[error("prediction endpoint error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("reading frame: {0}")]
    Frame(anyhow::Error),
    #[error("stopped after {failures} consecutive failures, last: {last}")]
    Halted { failures: u32, last: Box<PollError> },
}

impl From<reqwest::Error> for PollError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PollError::Timeout
        } else {
            PollError::Network(e)
        }
    }
}

#[derive(Serialize)]
struct PredictRequest {
    image: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    error: Option<String>,
}

/// What a finished run saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub frames: u32,
    pub successes: u32,
    pub failures: u32,
}

/// Sends frames to the inference endpoint on a fixed cadence.
///
/// Each request is cut off after the timeout. The loop halts once
/// `max_failures` requests fail in a row; any success resets the count.
pub struct PredictionPoller {
    client: Client,
    endpoint: String,
    interval: Duration,
    max_failures: u32,
}

impl PredictionPoller {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PollError> {
        Self::with_timing(endpoint, POLL_INTERVAL, REQUEST_TIMEOUT)
    }

    pub fn with_timing(
        endpoint: impl Into<String>,
        every: Duration,
        timeout: Duration,
    ) -> Result<Self, PollError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            interval: every,
            max_failures: MAX_CONSECUTIVE_FAILURES,
        })
    }

    /// One round trip for one JPEG frame.
    pub async fn predict(&self, jpeg: &[u8]) -> Result<Vec<Prediction>, PollError> {
        let body = PredictRequest {
            image: format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)),
        };
        let res = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = res.status();
        let text = res.text().await?;
        let parsed: Option<PredictResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|p| p.error)
                .unwrap_or_else(|| text.trim().to_string());
            return Err(PollError::Server {
                status: status.as_u16(),
                message,
            });
        }

        match parsed {
            Some(PredictResponse { error: Some(message), .. }) => Err(PollError::Server {
                status: status.as_u16(),
                message,
            }),
            Some(p) => Ok(p.predictions),
            None => Err(PollError::Server {
                status: status.as_u16(),
                message: format!("unreadable reply: {}", text.chars().take(80).collect::<String>()),
            }),
        }
    }

    /// Polls until the source runs dry or too many requests fail in a row.
    pub async fn run<S, F>(&self, source: &mut S, mut on_predictions: F) -> Result<PollStats, PollError>
    where
        S: FrameSource + ?Sized,
        F: FnMut(&[Prediction]) + Send,
    {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats = PollStats::default();
        let mut consecutive = 0u32;

        loop {
            ticker.tick().await;

            let Some(frame) = source.next_frame().await.map_err(PollError::Frame)? else {
                info!(?stats, "frame source exhausted");
                return Ok(stats);
            };
            stats.frames += 1;

            match self.predict(&frame).await {
                Ok(predictions) => {
                    if consecutive > 0 {
                        debug!(after = consecutive, "prediction endpoint recovered");
                    }
                    consecutive = 0;
                    stats.successes += 1;
                    on_predictions(&predictions);
                }
                Err(e) => {
                    consecutive += 1;
                    stats.failures += 1;
                    warn!(error = %e, attempt = consecutive, max = self.max_failures, "prediction failed");
                    if consecutive >= self.max_failures {
                        return Err(PollError::Halted {
                            failures: consecutive,
                            last: Box::new(e),
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    type Script = fn(usize) -> (StatusCode, Value);

    struct Endpoint {
        calls: AtomicUsize,
        script: Script,
    }

    async fn predict_handler(
        State(ep): State<Arc<Endpoint>>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        assert!(body["image"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
        let n = ep.calls.fetch_add(1, Ordering::SeqCst);
        let (status, value) = (ep.script)(n);
        (status, Json(value))
    }

    async fn spawn_endpoint(script: Script) -> (String, Arc<Endpoint>) {
        let ep = Arc::new(Endpoint {
            calls: AtomicUsize::new(0),
            script,
        });
        let app = Router::new()
            .route("/predict", post(predict_handler))
            .with_state(ep.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/predict", addr), ep)
    }

    fn ok_reply() -> (StatusCode, Value) {
        (
            StatusCode::OK,
            json!({ "success": true, "predictions": [
                { "class": "apple", "confidence": 91.5 },
                { "class": "pear", "confidence": 5.2 }
            ] }),
        )
    }

    fn fail_reply() -> (StatusCode, Value) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Model not loaded" }),
        )
    }

    struct Frames(u32);

    #[async_trait]
    impl FrameSource for Frames {
        async fn next_frame(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
            if self.0 == 0 {
                return Ok(None);
            }
            self.0 -= 1;
            Ok(Some(vec![0xff, 0xd8, 0xff]))
        }
    }

    fn fast(endpoint: &str) -> PredictionPoller {
        PredictionPoller::with_timing(endpoint, Duration::from_millis(1), Duration::from_millis(500))
            .unwrap()
    }

    #[tokio::test]
    async fn predict_reads_top_k() {
        let (url, _) = spawn_endpoint(|_| ok_reply()).await;
        let predictions = fast(&url).predict(b"jpeg").await.unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].class, "apple");
        assert_eq!(predictions[0].confidence, 91.5);
    }

    #[tokio::test]
    async fn server_error_carries_message() {
        let (url, _) = spawn_endpoint(|_| fail_reply()).await;
        match fast(&url).predict(b"jpeg").await {
            Err(PollError::Server { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Model not loaded");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn halts_after_five_failures_in_a_row() {
        let (url, ep) = spawn_endpoint(|_| fail_reply()).await;
        let mut frames = Frames(20);
        let err = fast(&url).run(&mut frames, |_| {}).await.unwrap_err();
        match err {
            PollError::Halted { failures, .. } => assert_eq!(failures, 5),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(ep.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        // four failures, one success, repeated
        let (url, _) = spawn_endpoint(|n| if n % 5 == 4 { ok_reply() } else { fail_reply() }).await;
        let mut frames = Frames(15);
        let mut seen = 0;
        let stats = fast(&url).run(&mut frames, |p| seen += p.len()).await.unwrap();
        assert_eq!(stats.frames, 15);
        assert_eq!(stats.successes, 3);
        assert_eq!(stats.failures, 12);
        assert_eq!(seen, 6);
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let app = Router::new().route(
            "/predict",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let poller = PredictionPoller::with_timing(
            format!("http://{}/predict", addr),
            Duration::from_millis(1),
            Duration::from_millis(100),
        )
        .unwrap();
        assert!(matches!(poller.predict(b"jpeg").await, Err(PollError::Timeout)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let poller = fast("http://127.0.0.1:9/predict");
        assert!(matches!(
            poller.predict(b"jpeg").await,
            Err(PollError::Network(_)) | Err(PollError::Timeout)
        ));
    }
}
