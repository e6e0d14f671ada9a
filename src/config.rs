//! Configuration management for the binarization worker.
//!
//! This module provides the command-line interface:
//! - `serve` runs the HTTP worker
//! - `distribute` splits an image across running workers
//!
//! Options can also be set via environment variables with the `BINARIZE_`
//! prefix; command-line flags take precedence.
//!
//! # Example
//!
//! ```ignore
//! use binarize_worker::config::{Cli, Command};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! if let Command::Serve(config) = cli.command {
//!     println!("Listening on {}", config.bind_address());
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `BINARIZE_HOST` - Server bind address (default: 0.0.0.0)
//! - `BINARIZE_PORT` - Server port (default: 5000)
//! - `BINARIZE_MAX_BODY_SIZE` - Maximum request body in bytes (default: 32 MiB)
//! - `BINARIZE_MAX_PIXELS` - Maximum decoded image size in pixels (default: 64 Mpx)
//! - `BINARIZE_REQUEST_TIMEOUT` - Processing deadline in seconds (default: 30)
//! - `BINARIZE_WORKERS` - Comma-separated worker URLs for `distribute`

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::distribute::RetryPolicy;
use crate::pipeline::DEFAULT_MAX_PIXELS;
use crate::server::DEFAULT_MAX_BODY_SIZE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default processing deadline in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default worker endpoint for `distribute`.
pub const DEFAULT_WORKER_URL: &str = "http://localhost:5000/process";

/// Default grid rows for `distribute`.
pub const DEFAULT_ROWS: u32 = 2;

/// Default grid columns for `distribute`.
pub const DEFAULT_COLS: u32 = 2;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Binarize Worker - high-contrast black/white rendition of raster images.
#[derive(Parser, Debug, Clone)]
#[command(name = "binarize-worker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP worker (POST /process).
    Serve(ServeConfig),

    /// Split an image into tiles, process them on workers, and stitch the result.
    Distribute(DistributeConfig),
}

// =============================================================================
// Serve Command
// =============================================================================

/// Options for `serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "BINARIZE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "BINARIZE_PORT")]
    pub port: u16,

    /// Maximum request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_SIZE, env = "BINARIZE_MAX_BODY_SIZE")]
    pub max_body_size: usize,

    /// Maximum image size in pixels (width x height), checked before decoding.
    #[arg(long, default_value_t = DEFAULT_MAX_PIXELS, env = "BINARIZE_MAX_PIXELS")]
    pub max_pixels: u64,

    /// Seconds allowed to process one image before answering 503.
    #[arg(
        long = "request-timeout",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS,
        env = "BINARIZE_REQUEST_TIMEOUT"
    )]
    pub request_timeout_secs: u64,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host must not be empty".to_string());
        }

        if self.max_body_size == 0 {
            return Err("max_body_size must be greater than 0".to_string());
        }

        if self.max_pixels == 0 {
            return Err("max_pixels must be greater than 0".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout must be at least 1 second".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Processing deadline as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Distribute Command
// =============================================================================

/// Options for `distribute`.
#[derive(Args, Debug, Clone)]
pub struct DistributeConfig {
    /// Image to process.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the stitched result (format from extension).
    #[arg(short, long)]
    pub output: PathBuf,

    /// Worker endpoint URL; repeat or comma-separate for several.
    #[arg(
        long = "worker",
        env = "BINARIZE_WORKERS",
        value_delimiter = ',',
        default_value = DEFAULT_WORKER_URL
    )]
    pub workers: Vec<String>,

    /// Number of tile rows.
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    pub rows: u32,

    /// Number of tile columns.
    #[arg(long, default_value_t = DEFAULT_COLS)]
    pub cols: u32,

    /// Attempts per tile before giving up.
    #[arg(long, default_value_t = crate::distribute::DEFAULT_MAX_ATTEMPTS)]
    pub retries: u32,

    /// Delay before the first retry in milliseconds; doubles on each retry.
    #[arg(long, default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// TCP connect timeout in seconds.
    #[arg(long = "connect-timeout", default_value_t = 5)]
    pub connect_timeout_secs: u64,

    /// Timeout for one worker request in seconds.
    #[arg(long = "request-timeout", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl DistributeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers.is_empty() {
            return Err("At least one --worker URL is required".to_string());
        }

        if let Some(bad) = self
            .workers
            .iter()
            .find(|url| !(url.starts_with("http://") || url.starts_with("https://")))
        {
            return Err(format!(
                "Worker URL must start with http:// or https://: {}",
                bad
            ));
        }

        if self.rows == 0 || self.cols == 0 {
            return Err("rows and cols must be greater than 0".to_string());
        }

        if self.retries == 0 {
            return Err("retries must be greater than 0".to_string());
        }

        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err("timeouts must be at least 1 second".to_string());
        }

        Ok(())
    }

    /// TCP connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Total timeout for one worker request.
    pub fn worker_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Retry policy derived from `retries` and `retry_delay_ms`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_millis(self.retry_delay_ms))
    }
}

// =============================================================================
// Tests
// =============================================================================
