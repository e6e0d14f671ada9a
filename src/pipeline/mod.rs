//! The pixel pipeline.
//!
//! A pure, stateless transformation from encoded image bytes to a PNG whose
//! every sample is either 0 or 255.
//!
//! # Stages
//!
//! ```text
//!  bytes ──► decode ──► luminance ──► gaussian blur ──► threshold ──► PNG
//!            (codec)     (luma)        (blur, r = 2)     (> 100)      (codec)
//! ```
//!
//! Stage order is fixed: the blur reads luminance values and the threshold
//! reads blurred values. Given the same input bytes the output bytes are
//! always identical.
//!
//! # Components
//!
//! - [`ImageProcessor`]: runs the full pass, shareable across requests
//! - [`GaussianKernel`]: Q16 fixed-point 1-D kernel, computed once
//! - [`gaussian_blur`]: separable convolution with clamp-to-edge borders
//! - [`to_luminance`]: BT.601 luma conversion
//! - [`binarize`]: in-place fixed threshold

mod blur;
mod codec;
mod kernel;
mod luma;
mod processor;
mod threshold;

pub use blur::gaussian_blur;
pub use codec::{decode, encode_png, inspect, DecodedImage};
pub use kernel::{default_kernel, GaussianKernel, KERNEL_FRACTION_BITS, KERNEL_SCALE};
pub use luma::{luma, to_luminance};
pub use processor::{ImageProcessor, ProcessedImage};
pub use threshold::{binarize, binarize_sample, BLACK, WHITE};

/// Blur radius in samples; the kernel spans `2 * BLUR_RADIUS + 1` taps.
pub const BLUR_RADIUS: u32 = 2;

/// Standard deviation of the blur, in samples. The kernel is truncated at
/// `BLUR_RADIUS / BLUR_SIGMA = 2` standard deviations.
pub const BLUR_SIGMA: f64 = 1.0;

/// Blurred samples strictly above this value become white.
pub const BINARY_THRESHOLD: u8 = 100;

/// Default pixel budget (64 megapixels).
pub const DEFAULT_MAX_PIXELS: u64 = 64 * 1024 * 1024;
