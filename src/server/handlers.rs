//! HTTP request handlers for the binarization worker.
//!
//! # Endpoints
//!
//! - `POST /process` - Binarize the image in multipart field `image`
//! - `GET /health` - Health check endpoint

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use http::header::{self, HeaderName};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{PipelineError, ProcessError};
use crate::pipeline::ImageProcessor;

/// Name of the multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Default time allowed for processing a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response header carrying the output width in pixels.
pub const IMAGE_WIDTH_HEADER: &str = "x-image-width";

/// Response header carrying the output height in pixels.
pub const IMAGE_HEIGHT_HEADER: &str = "x-image-height";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// The processor is read-only, so requests share it without locking.
#[derive(Clone)]
pub struct AppState {
    /// The pixel pipeline
    pub processor: Arc<ImageProcessor>,

    /// Deadline for decoding and transforming one image
    pub request_timeout: Duration,
}

impl AppState {
    /// Create a new application state with the default request timeout.
    pub fn new(processor: ImageProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the processing deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ProcessError to a plain-text HTTP response.
///
/// The body carries a short diagnostic only; decoder and join-error details
/// go to the log. 5xx are logged at ERROR, 4xx at WARN.
impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        let (status, error_type, body) = match &self {
            ProcessError::InputMissing { reason } => (
                StatusCode::BAD_REQUEST,
                "missing_input",
                format!("No image data: {}", reason),
            ),

            ProcessError::DuplicateField { name } => (
                StatusCode::BAD_REQUEST,
                "duplicate_field",
                format!("Expected exactly one '{}' field", name),
            ),

            ProcessError::Multipart { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST),
                "invalid_multipart",
                message.clone(),
            ),

            // Undecodable client bytes stay a server error, matching the
            // behavior existing clients of /process rely on.
            ProcessError::Pipeline(PipelineError::Decode { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "decode_error",
                "Image processing failed: could not decode image".to_string(),
            ),

            ProcessError::Pipeline(err @ PipelineError::TooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "too_large", err.to_string())
            }

            ProcessError::Pipeline(PipelineError::Encode { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "encode_error",
                "Image processing failed: could not encode result".to_string(),
            ),

            ProcessError::Timeout { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "timeout",
                "Image processing timed out".to_string(),
            ),

            ProcessError::Internal { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                self
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                self
            );
        }

        (status, body).into_response()
    }
}

fn multipart_error(err: MultipartError) -> ProcessError {
    ProcessError::Multipart {
        status: err.status().as_u16(),
        message: err.body_text(),
    }
}

/// Pull the single `image` field out of the form.
///
/// Other fields are skipped. A missing or empty field, or a second `image`
/// field, is rejected before any decoding happens.
async fn read_image_field(mut multipart: Multipart) -> Result<Bytes, ProcessError> {
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }

        if image.is_some() {
            return Err(ProcessError::DuplicateField {
                name: IMAGE_FIELD.to_string(),
            });
        }

        image = Some(field.bytes().await.map_err(multipart_error)?);
    }

    match image {
        None => Err(ProcessError::InputMissing {
            reason: format!("multipart field '{}' not found", IMAGE_FIELD),
        }),
        Some(data) if data.is_empty() => Err(ProcessError::InputMissing {
            reason: format!("multipart field '{}' is empty", IMAGE_FIELD),
        }),
        Some(data) => Ok(data),
    }
}

/// Run `work` on the blocking pool under `deadline`.
///
/// A missed deadline is [`ProcessError::Timeout`]; the task keeps running
/// and its result is dropped. A panic inside `work` is
/// [`ProcessError::Internal`].
async fn run_blocking<F, T>(deadline: Duration, work: F) -> Result<T, ProcessError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);

    tokio::time::timeout(deadline, task)
        .await
        .map_err(|_| ProcessError::Timeout { after: deadline })?
        .map_err(|e| ProcessError::Internal {
            message: e.to_string(),
        })
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle binarization requests.
///
/// # Endpoint
///
/// `POST /process` with `Content-Type: multipart/form-data`
///
/// # Form Fields
///
/// - `image`: the encoded image (PNG, JPEG, GIF, BMP, TIFF or WebP; detected
///   from content)
///
/// # Response
///
/// - `200 OK`: PNG image with `Content-Type: image/png`
/// - `400 Bad Request`: Not a multipart body, or `image` missing/empty/repeated
/// - `413 Payload Too Large`: Body or pixel count over the configured limit
/// - `500 Internal Server Error`: Decode, encode or internal failure
/// - `503 Service Unavailable`: Processing exceeded the request timeout
///
/// # Headers
///
/// - `Content-Type: image/png`
/// - `X-Image-Width`, `X-Image-Height`: output dimensions
///
/// The pipeline runs on the blocking pool. If the deadline passes the
/// response is an error and the late result is dropped, so a truncated
/// image is never sent.
pub async fn process_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ProcessError> {
    let multipart = multipart.map_err(|rejection| ProcessError::InputMissing {
        reason: rejection.body_text(),
    })?;

    let payload = read_image_field(multipart).await?;

    let processor = Arc::clone(&state.processor);
    let output = run_blocking(state.request_timeout, move || processor.process(&payload)).await??;

    let headers = [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (
            HeaderName::from_static(IMAGE_WIDTH_HEADER),
            output.width.to_string(),
        ),
        (
            HeaderName::from_static(IMAGE_HEIGHT_HEADER),
            output.height.to_string(),
        ),
    ];

    Ok((StatusCode::OK, headers, Body::from(output.data)).into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
