//! Worker abstraction and the HTTP client implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::error::DistributeError;
use crate::server::IMAGE_FIELD;

/// Default number of attempts per tile.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Default TCP connect timeout for worker requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default total timeout for a single worker request.
pub const DEFAULT_WORKER_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that binarizes one encoded tile.
#[async_trait]
pub trait TileWorker: Send + Sync {
    /// Send `tile` (encoded image bytes) and return the processed PNG bytes.
    async fn process(&self, tile: Bytes) -> Result<Bytes, DistributeError>;

    /// A human-readable name for logs (usually the URL).
    fn endpoint(&self) -> &str;
}

/// A remote worker reached over `POST /process`.
#[derive(Debug, Clone)]
pub struct HttpWorker {
    client: reqwest::Client,
    url: String,
}

impl HttpWorker {
    /// Create a worker for `url` that shares `client`'s connection pool.
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

/// Build the HTTP client used by [`HttpWorker`]s.
pub fn build_http_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<reqwest::Client, DistributeError> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| DistributeError::Request {
            url: String::new(),
            message: e.to_string(),
        })
}

#[async_trait]
impl TileWorker for HttpWorker {
    async fn process(&self, tile: Bytes) -> Result<Bytes, DistributeError> {
        let request_error = |e: reqwest::Error| DistributeError::Request {
            url: self.url.clone(),
            message: e.to_string(),
        };

        let part = Part::bytes(tile.to_vec())
            .file_name("tile.png")
            .mime_str("image/png")
            .map_err(request_error)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DistributeError::Worker {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(request_error)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Exponential backoff: wait `initial_delay`, then double, between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Wait after the first failure
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt count and first delay.
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    /// Wait before attempt `failed + 1`, after `failed` failures (1-based).
    pub fn delay_after(&self, failed: u32) -> Duration {
        let shift = failed.saturating_sub(1).min(16);
        self.initial_delay.saturating_mul(1 << shift)
    }
}

/// Run `worker.process` until it succeeds or the policy is exhausted.
pub async fn process_with_retry<W>(
    worker: &W,
    tile: Bytes,
    policy: &RetryPolicy,
) -> Result<Bytes, DistributeError>
where
    W: TileWorker + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match worker.process(tile.clone()).await {
            Ok(data) => {
                debug!(worker = worker.endpoint(), attempt, "Tile processed");
                return Ok(data);
            }
            Err(err) if attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    worker = worker.endpoint(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Tile attempt failed: {}",
                    err
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                return Err(DistributeError::RetriesExhausted {
                    url: worker.endpoint().to_string(),
                    attempts: attempt,
                    last: err.to_string(),
                });
            }
        }
    }
}
