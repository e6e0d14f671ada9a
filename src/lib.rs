//! # Binarize Worker
//!
//! An HTTP worker that turns a raster image into a deterministic,
//! high-contrast black/white PNG.
//!
//! Every request runs the same fixed pipeline: luminance conversion, a
//! radius-2 Gaussian blur, and binarization at threshold 100. The worker
//! keeps no state between requests.
//!
//! ## Features
//!
//! - **Deterministic output**: integer fixed-point arithmetic end to end, so
//!   identical input bytes always give identical output bytes
//! - **Format sniffing**: PNG, JPEG, GIF, BMP, TIFF and WebP input, detected
//!   from content
//! - **Resource limits**: request body and pixel-count caps, plus a per-request
//!   processing deadline
//! - **Tile distribution**: a client that splits large images across a pool of
//!   workers and stitches the results
//!
//! ## Architecture
//!
//! - [`pipeline`] - Decode, grayscale, blur, threshold, encode
//! - [`server`] - Axum-based HTTP server and routes
//! - [`distribute`] - Tile grid, worker client with retry, stitching
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use binarize_worker::{create_router, ImageProcessor, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = create_router(ImageProcessor::new(), RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod distribute;
pub mod error;
pub mod pipeline;
pub mod server;

// Re-export commonly used types
pub use config::{Cli, Command, DistributeConfig, ServeConfig};
pub use distribute::{
    DistributionOutcome, Distributor, HttpWorker, RetryPolicy, TileFailure, TileGrid, TileRegion,
    TileWorker,
};
pub use error::{DistributeError, PipelineError, ProcessError};
pub use pipeline::{
    GaussianKernel, ImageProcessor, ProcessedImage, BINARY_THRESHOLD, BLUR_RADIUS, BLUR_SIGMA,
    DEFAULT_MAX_PIXELS,
};
pub use server::{
    create_router, health_handler, process_handler, AppState, HealthResponse, RouterConfig,
};
