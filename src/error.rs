use std::time::Duration;

use thiserror::Error;

/// Errors raised by the pixel pipeline itself.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Input bytes are not a recognized or valid image encoding
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Image header declares more pixels than the processor accepts
    #[error("Image too large: {width}x{height} exceeds the limit of {max_pixels} pixels")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    /// Serializing the binarized buffer failed
    #[error("Failed to encode image: {message}")]
    Encode { message: String },
}

/// Errors surfaced by the `/process` request adapter.
#[derive(Debug, Clone, Error)]
pub enum ProcessError {
    /// No usable image payload in the request (maps to HTTP 400)
    #[error("No image data: {reason}")]
    InputMissing { reason: String },

    /// The form carried the image field more than once (maps to HTTP 400)
    #[error("Duplicate multipart field '{name}'")]
    DuplicateField { name: String },

    /// The multipart body could not be read (status chosen by axum, e.g. 413)
    #[error("Invalid multipart body: {message}")]
    Multipart { status: u16, message: String },

    /// The pipeline rejected or failed on the payload
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Processing did not finish before the request deadline
    #[error("Processing timed out after {after:?}")]
    Timeout { after: Duration },

    /// The processing task died (panic or cancellation)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised by the tile distributor.
#[derive(Debug, Clone, Error)]
pub enum DistributeError {
    /// Reading the input or writing the output failed
    #[error("I/O error: {0}")]
    Io(String),

    /// The input image (or a worker's reply) could not be decoded
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// A tile could not be encoded for upload
    #[error("Failed to encode tile: {0}")]
    Encode(String),

    /// The requested grid does not fit the image
    #[error("Invalid grid: {rows}x{cols} tiles for a {width}x{height} image")]
    InvalidGrid {
        rows: u32,
        cols: u32,
        width: u32,
        height: u32,
    },

    /// No worker endpoints were configured
    #[error("No workers configured")]
    NoWorkers,

    /// A worker answered with a non-success status
    #[error("Worker {url} returned HTTP {status}")]
    Worker { url: String, status: u16 },

    /// The request to a worker failed at the transport level
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Every attempt for a tile failed
    #[error("Gave up on {url} after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },

    /// A worker returned a tile whose size differs from the one it was sent
    #[error("Tile size mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    TileMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },
}
