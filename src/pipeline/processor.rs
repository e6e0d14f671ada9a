//! Stage orchestration: decode → grayscale → blur → threshold → encode.

use bytes::Bytes;
use image::{GrayImage, ImageFormat};
use tracing::debug;

use crate::error::PipelineError;

use super::blur::gaussian_blur;
use super::codec::{decode, encode_png};
use super::kernel::{default_kernel, GaussianKernel};
use super::luma::to_luminance;
use super::threshold::binarize;
use super::{BINARY_THRESHOLD, DEFAULT_MAX_PIXELS};

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// PNG-encoded binary image
    pub data: Bytes,

    /// Width in pixels (same as the input)
    pub width: u32,

    /// Height in pixels (same as the input)
    pub height: u32,

    /// Format the input was decoded as
    pub source_format: ImageFormat,
}

/// Stateless binarization pipeline.
///
/// Holds only read-only settings, so one instance can be shared across any
/// number of concurrent requests.
///
/// # Example
///
/// ```ignore
/// use binarize_worker::pipeline::ImageProcessor;
///
/// let processor = ImageProcessor::new();
/// let output = processor.process(&input_bytes)?;
/// assert_eq!(&output.data[1..4], b"PNG");
/// ```
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    kernel: &'static GaussianKernel,
    threshold: u8,
    max_pixels: u64,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProcessor {
    /// Create a processor with the fixed radius-2 kernel, threshold 100 and
    /// the default pixel budget.
    pub fn new() -> Self {
        Self {
            kernel: default_kernel(),
            threshold: BINARY_THRESHOLD,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Set the largest image (in pixels) that will be decoded.
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// The pixel budget applied before decoding.
    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }

    /// The binarization threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// The blur kernel.
    pub fn kernel(&self) -> &GaussianKernel {
        self.kernel
    }

    /// Run the pixel stages on an already single-channel plane.
    ///
    /// Blurs, then binarizes in place. Exposed separately so callers holding
    /// raw pixels can skip the codec.
    pub fn binarize_plane(&self, luminance: &GrayImage) -> GrayImage {
        let mut blurred = gaussian_blur(luminance, self.kernel);
        binarize(&mut blurred, self.threshold);
        blurred
    }

    /// Transform encoded input bytes into a PNG-encoded black/white image.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Decode`] if the input is not a decodable image
    /// - [`PipelineError::TooLarge`] if the image exceeds the pixel budget
    /// - [`PipelineError::Encode`] if PNG serialization fails
    pub fn process(&self, input: &[u8]) -> Result<ProcessedImage, PipelineError> {
        let decoded = decode(input, self.max_pixels)?;
        let source_format = decoded.format;

        let luminance = to_luminance(decoded.image);
        let (width, height) = luminance.dimensions();

        let binary = self.binarize_plane(&luminance);
        let data = encode_png(&binary)?;

        debug!(
            format = ?source_format,
            width,
            height,
            input_bytes = input.len(),
            output_bytes = data.len(),
            "Image binarized"
        );

        Ok(ProcessedImage {
            data,
            width,
            height,
            source_format,
        })
    }
}
