//! Splitting an image into a grid of tiles and stitching results back.

use image::{imageops, DynamicImage, GrayImage};

use crate::error::DistributeError;

/// One cell of a [`TileGrid`], in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    /// Row-major position in the grid
    pub index: usize,

    /// Grid row (0 = top)
    pub row: u32,

    /// Grid column (0 = left)
    pub col: u32,

    /// Left edge in pixels
    pub x: u32,

    /// Top edge in pixels
    pub y: u32,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

/// A `rows` x `cols` partition of a `width` x `height` image.
///
/// Cells are `width / cols` by `height / rows`; the last column and last row
/// absorb the remainder so every pixel belongs to exactly one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    rows: u32,
    cols: u32,
}

impl TileGrid {
    /// Create a grid, failing if any cell would be empty.
    pub fn new(width: u32, height: u32, rows: u32, cols: u32) -> Result<Self, DistributeError> {
        if rows == 0 || cols == 0 || rows > height || cols > width {
            return Err(DistributeError::InvalidGrid {
                rows,
                cols,
                width,
                height,
            });
        }

        Ok(Self {
            width,
            height,
            rows,
            cols,
        })
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        (self.rows * self.cols) as usize
    }

    /// Always false; a valid grid has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All cells in row-major order.
    pub fn regions(&self) -> Vec<TileRegion> {
        let tile_width = self.width / self.cols;
        let tile_height = self.height / self.rows;

        let mut regions = Vec::with_capacity(self.len());
        for row in 0..self.rows {
            for col in 0..self.cols {
                let x = col * tile_width;
                let y = row * tile_height;
                let width = if col == self.cols - 1 {
                    self.width - x
                } else {
                    tile_width
                };
                let height = if row == self.rows - 1 {
                    self.height - y
                } else {
                    tile_height
                };

                regions.push(TileRegion {
                    index: regions.len(),
                    row,
                    col,
                    x,
                    y,
                    width,
                    height,
                });
            }
        }
        regions
    }
}

/// Copy the pixels of `region` out of `image`.
pub fn crop(image: &DynamicImage, region: &TileRegion) -> DynamicImage {
    image.crop_imm(region.x, region.y, region.width, region.height)
}

/// Paste processed tiles onto a black `width` x `height` canvas.
///
/// Regions with no tile stay black.
pub fn stitch<I>(width: u32, height: u32, tiles: I) -> Result<GrayImage, DistributeError>
where
    I: IntoIterator<Item = (TileRegion, GrayImage)>,
{
    let mut canvas = GrayImage::new(width, height);

    for (region, tile) in tiles {
        if tile.dimensions() != (region.width, region.height) {
            return Err(DistributeError::TileMismatch {
                expected_width: region.width,
                expected_height: region.height,
                width: tile.width(),
                height: tile.height(),
            });
        }
        imageops::replace(&mut canvas, &tile, region.x as i64, region.y as i64);
    }

    Ok(canvas)
}
