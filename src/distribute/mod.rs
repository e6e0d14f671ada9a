//! Fan a large image out to a pool of workers, tile by tile.
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────────┐
//!  input ───►│   TileGrid   │── rows x cols regions (row-major)
//!            └──────┬───────┘
//!                   │ tile i → worker i % N, all tiles in flight at once
//!         ┌─────────┼─────────┐
//!         ▼         ▼         ▼
//!     worker 0  worker 1  worker 2      POST /process (with retry)
//!         │         │         │
//!         └─────────┼─────────┘
//!                   ▼
//!            ┌──────────────┐
//!            │    stitch    │── failed regions stay black
//!            └──────────────┘
//! ```
//!
//! Each tile is binarized independently, so pixels near a tile seam are
//! blurred with clamp-to-edge instead of their true neighbours. The stitched
//! result therefore differs from binarizing the whole image at once along
//! the seams.

mod tiling;
mod worker;

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use image::{DynamicImage, GrayImage, ImageFormat};
use tracing::{error, info};

use crate::config::DistributeConfig;
use crate::error::DistributeError;

pub use tiling::{crop, stitch, TileGrid, TileRegion};
pub use worker::{
    build_http_client, process_with_retry, HttpWorker, RetryPolicy, TileWorker,
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, DEFAULT_WORKER_TIMEOUT,
};

/// A tile that could not be processed.
#[derive(Debug, Clone)]
pub struct TileFailure {
    /// Where the tile sits in the output
    pub region: TileRegion,

    /// Worker the tile was assigned to
    pub worker: String,

    /// Final error after retries
    pub error: DistributeError,
}

/// Result of a distributed run.
#[derive(Debug, Clone)]
pub struct DistributionOutcome {
    /// The stitched binary image, same size as the input
    pub image: GrayImage,

    /// Number of tiles the image was split into
    pub tile_count: usize,

    /// Tiles whose region was left black
    pub failures: Vec<TileFailure>,
}

impl DistributionOutcome {
    /// True if every tile came back.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Splits images into a grid and dispatches tiles round-robin.
pub struct Distributor<W: TileWorker> {
    workers: Vec<Arc<W>>,
    rows: u32,
    cols: u32,
    retry: RetryPolicy,
}

impl Distributor<HttpWorker> {
    /// Build a distributor over HTTP workers from the command configuration.
    pub fn from_config(config: &DistributeConfig) -> Result<Self, DistributeError> {
        let client = build_http_client(config.connect_timeout(), config.worker_timeout())?;
        let workers = config
            .workers
            .iter()
            .map(|url| HttpWorker::new(client.clone(), url.as_str()))
            .collect();

        Ok(Self::new(workers, config.rows, config.cols)?.with_retry_policy(config.retry_policy()))
    }
}

impl<W: TileWorker + 'static> Distributor<W> {
    /// Create a distributor for a `rows` x `cols` grid.
    pub fn new(workers: Vec<W>, rows: u32, cols: u32) -> Result<Self, DistributeError> {
        if workers.is_empty() {
            return Err(DistributeError::NoWorkers);
        }

        Ok(Self {
            workers: workers.into_iter().map(Arc::new).collect(),
            rows,
            cols,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Binarize `image` by sending its tiles to the workers and stitching
    /// the replies.
    ///
    /// Tiles are cropped and PNG-encoded on the blocking pool inside their
    /// own task, so encoding overlaps with uploads. A tile that cannot be
    /// encoded, or still fails after retries, is reported in
    /// [`DistributionOutcome::failures`] and left black; only an invalid grid
    /// aborts the whole run.
    pub async fn run(&self, image: &DynamicImage) -> Result<DistributionOutcome, DistributeError> {
        let grid = TileGrid::new(image.width(), image.height(), self.rows, self.cols)?;
        let regions = grid.regions();

        let source = Arc::new(image.clone());

        let mut handles = Vec::with_capacity(regions.len());
        for region in &regions {
            let worker = Arc::clone(&self.workers[region.index % self.workers.len()]);
            let source = Arc::clone(&source);
            let retry = self.retry.clone();
            let region = *region;

            handles.push(tokio::spawn(async move {
                let tile =
                    tokio::task::spawn_blocking(move || encode_tile(&crop(&source, &region)))
                        .await
                        .map_err(|e| DistributeError::Encode(e.to_string()))??;
                let data = process_with_retry(worker.as_ref(), tile, &retry).await?;
                decode_tile(&data, &region)
            }));
        }

        let mut tiles = Vec::with_capacity(regions.len());
        let mut failures = Vec::new();

        for (region, handle) in regions.iter().zip(handles) {
            let worker = self.workers[region.index % self.workers.len()]
                .endpoint()
                .to_string();

            let result = handle.await.unwrap_or_else(|e| {
                Err(DistributeError::Request {
                    url: worker.clone(),
                    message: e.to_string(),
                })
            });

            match result {
                Ok(tile) => tiles.push((*region, tile)),
                Err(err) => {
                    error!(
                        tile = region.index,
                        row = region.row,
                        col = region.col,
                        worker = %worker,
                        "Tile failed: {}",
                        err
                    );
                    failures.push(TileFailure {
                        region: *region,
                        worker,
                        error: err,
                    });
                }
            }
        }

        let stitched = stitch(image.width(), image.height(), tiles)?;

        Ok(DistributionOutcome {
            image: stitched,
            tile_count: regions.len(),
            failures,
        })
    }

    /// Read `input`, run the distribution, and write the result to `output`.
    ///
    /// The output format follows the output file extension. The file is
    /// written even when some tiles failed.
    pub async fn run_file(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<DistributionOutcome, DistributeError> {
        let image = image::open(input).map_err(|e| match e {
            image::ImageError::IoError(io) => DistributeError::Io(io.to_string()),
            other => DistributeError::Decode(other.to_string()),
        })?;

        info!(
            input = %input.display(),
            width = image.width(),
            height = image.height(),
            rows = self.rows,
            cols = self.cols,
            workers = self.workers.len(),
            "Distributing image"
        );

        let outcome = self.run(&image).await?;

        outcome
            .image
            .save(output)
            .map_err(|e| DistributeError::Io(e.to_string()))?;

        info!(
            output = %output.display(),
            tiles = outcome.tile_count,
            failed = outcome.failures.len(),
            "Wrote stitched image"
        );

        Ok(outcome)
    }
}

/// Encode a tile losslessly for upload.
fn encode_tile(tile: &DynamicImage) -> Result<Bytes, DistributeError> {
    let mut buf = Vec::new();
    tile.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| DistributeError::Encode(e.to_string()))?;
    Ok(Bytes::from(buf))
}

/// Decode a worker reply and check it matches the region it was cut from.
fn decode_tile(data: &[u8], region: &TileRegion) -> Result<GrayImage, DistributeError> {
    let tile = image::load_from_memory(data)
        .map_err(|e| DistributeError::Decode(e.to_string()))?
        .into_luma8();

    if tile.dimensions() != (region.width, region.height) {
        return Err(DistributeError::TileMismatch {
            expected_width: region.width,
            expected_height: region.height,
            width: tile.width(),
            height: tile.height(),
        });
    }

    Ok(tile)
}
