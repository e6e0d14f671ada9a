//! Decode and encode at the edges of the pipeline.
//!
//! # Design Decisions
//!
//! - **Format from content**: the input format is sniffed from the magic bytes,
//!   never from a filename or content-type claim.
//!
//! - **Header check before decode**: dimensions are read from the header first
//!   so oversized images are rejected before any pixel allocation.
//!
//! - **PNG only on output**: the binarized plane is always written as 8-bit
//!   grayscale PNG, which is lossless, so re-decoding gives back the exact
//!   0/255 grid.

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::PipelineError;

/// A decoded input image along with the format it was sniffed as.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Decoded pixels, in whatever channel layout the source used
    pub image: DynamicImage,

    /// Format detected from the leading bytes
    pub format: ImageFormat,
}

fn reader(source: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, PipelineError> {
    if source.is_empty() {
        return Err(PipelineError::Decode {
            message: "empty input".to_string(),
        });
    }

    let reader = ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            message: e.to_string(),
        })?;

    if reader.format().is_none() {
        return Err(PipelineError::Decode {
            message: "unrecognized image format".to_string(),
        });
    }

    Ok(reader)
}

/// Read the format and dimensions from the image header without decoding pixels.
pub fn inspect(source: &[u8]) -> Result<(ImageFormat, u32, u32), PipelineError> {
    let reader = reader(source)?;
    let format = reader.format().ok_or_else(|| PipelineError::Decode {
        message: "unrecognized image format".to_string(),
    })?;

    let (width, height) = reader.into_dimensions().map_err(|e| PipelineError::Decode {
        message: e.to_string(),
    })?;

    Ok((format, width, height))
}

/// Decode `source`, refusing images with more than `max_pixels` pixels.
///
/// # Errors
///
/// - [`PipelineError::Decode`] if the bytes are empty, of an unknown format,
///   or corrupt
/// - [`PipelineError::TooLarge`] if the header exceeds the pixel budget
pub fn decode(source: &[u8], max_pixels: u64) -> Result<DecodedImage, PipelineError> {
    let (format, width, height) = inspect(source)?;

    if width as u64 * height as u64 > max_pixels {
        return Err(PipelineError::TooLarge {
            width,
            height,
            max_pixels,
        });
    }

    let image = reader(source)?
        .decode()
        .map_err(|e| PipelineError::Decode {
            message: e.to_string(),
        })?;

    Ok(DecodedImage { image, format })
}

/// Encode a single-channel plane as an 8-bit grayscale PNG.
pub fn encode_png(image: &GrayImage) -> Result<Bytes, PipelineError> {
    let mut output = Vec::new();
    let encoder = PngEncoder::new(&mut output);

    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::L8,
        )
        .map_err(|e| PipelineError::Encode {
            message: e.to_string(),
        })?;

    Ok(Bytes::from(output))
}
