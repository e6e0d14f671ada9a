//! HTTP server layer for the binarization worker.
//!
//! Bridges HTTP to the byte-in/byte-out pixel pipeline and maps pipeline
//! outcomes onto status codes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                       POST /process                             │
//! │                                                                 │
//! │  ┌──────────────────────────┐   ┌────────────────────────────┐  │
//! │  │         handlers         │   │           routes           │  │
//! │  │ (multipart, error → HTTP)│   │ (body limit, tracing)      │  │
//! │  └──────────────────────────┘   └────────────────────────────┘  │
//! └────────────────────────────────┬────────────────────────────────┘
//!                                  ▼
//!                          ImageProcessor (blocking pool)
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, process_handler, AppState, HealthResponse, DEFAULT_REQUEST_TIMEOUT,
    IMAGE_FIELD, IMAGE_HEIGHT_HEADER, IMAGE_WIDTH_HEADER,
};
pub use routes::{create_router, RouterConfig, DEFAULT_MAX_BODY_SIZE};
