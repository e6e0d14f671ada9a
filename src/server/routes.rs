//! Router configuration for the binarization worker.
//!
//! # Route Structure
//!
//! ```text
//! /process    POST  - Binarize an image (multipart field `image`)
//! /health     GET   - Health check
//! ```
//!
//! # Example
//!
//! ```ignore
//! use binarize_worker::pipeline::ImageProcessor;
//! use binarize_worker::server::routes::{create_router, RouterConfig};
//!
//! let config = RouterConfig::new().with_max_body_size(8 * 1024 * 1024);
//! let router = create_router(ImageProcessor::new(), config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, process_handler, AppState, DEFAULT_REQUEST_TIMEOUT};
use crate::pipeline::ImageProcessor;

/// Default maximum request body size (32 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 32 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Largest accepted request body in bytes
    pub max_body_size: usize,

    /// Deadline for processing one image
    pub request_timeout: Duration,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a router configuration with defaults:
    /// - 32 MiB body limit
    /// - 30 second processing deadline
    /// - Tracing enabled
    pub fn new() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            enable_tracing: true,
        }
    }

    /// Set the maximum request body size in bytes.
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Set the processing deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// # Arguments
///
/// * `processor` - The pixel pipeline shared by all requests
/// * `config` - Router configuration
pub fn create_router(processor: ImageProcessor, config: RouterConfig) -> Router {
    let app_state = AppState::new(processor).with_request_timeout(config.request_timeout);

    let router = Router::new()
        .route("/process", post(process_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .with_state(app_state);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

// =============================================================================
// Tests
// =============================================================================
