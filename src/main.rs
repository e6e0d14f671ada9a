//! Binarize Worker - black/white image processing over HTTP.
//!
//! This binary starts the HTTP worker or runs the tile distributor.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use binarize_worker::{
    config::{Cli, Command, DistributeConfig, ServeConfig},
    create_router,
    distribute::Distributor,
    pipeline::{ImageProcessor, BINARY_THRESHOLD, BLUR_RADIUS},
    server::RouterConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => run_serve(config).await,
        Command::Distribute(config) => run_distribute(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Binarize Worker v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Blur radius: {}, threshold: {}", BLUR_RADIUS, BINARY_THRESHOLD);
    info!(
        "  Limits: {} byte body, {} pixels, {}s per request",
        config.max_body_size, config.max_pixels, config.request_timeout_secs
    );

    let processor = ImageProcessor::new().with_max_pixels(config.max_pixels);
    let router_config = RouterConfig::new()
        .with_max_body_size(config.max_body_size)
        .with_request_timeout(config.request_timeout())
        .with_tracing(!config.no_tracing);

    let router = create_router(processor, router_config);

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!(
        "  Try: curl -F image=@photo.jpg http://{}/process -o out.png",
        addr
    );

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Resolve on Ctrl-C so in-flight responses finish before exit.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

// =============================================================================
// Distribute Command
// =============================================================================

async fn run_distribute(config: DistributeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let distributor = match Distributor::from_config(&config) {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to create distributor: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match distributor.run_file(&config.input, &config.output).await {
        Ok(outcome) if outcome.is_complete() => {
            info!(
                "Processed {} tile(s) into {}",
                outcome.tile_count,
                config.output.display()
            );
            ExitCode::SUCCESS
        }
        Ok(outcome) => {
            warn!(
                "{} of {} tile(s) failed and were left black in {}",
                outcome.failures.len(),
                outcome.tile_count,
                config.output.display()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Distribution failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "binarize_worker=debug,tower_http=debug"
    } else {
        "binarize_worker=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
