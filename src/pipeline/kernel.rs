//! Fixed-point 1-D Gaussian kernel.
//!
//! The blur is separable, so a single 1-D weight vector is applied once
//! horizontally and once vertically. Weights are stored in Q16 fixed point
//! so the convolution is pure integer arithmetic and bit-exact on every
//! platform.

use std::sync::LazyLock;

use super::{BLUR_RADIUS, BLUR_SIGMA};

/// Number of fractional bits in a kernel weight.
pub const KERNEL_FRACTION_BITS: u32 = 16;

/// Fixed-point value of 1.0; the weights of every kernel sum to exactly this.
pub const KERNEL_SCALE: u32 = 1 << KERNEL_FRACTION_BITS;

static DEFAULT_KERNEL: LazyLock<GaussianKernel> =
    LazyLock::new(|| GaussianKernel::new(BLUR_RADIUS, BLUR_SIGMA));

/// The process-wide radius-2 kernel used by the pipeline.
///
/// Computed on first use and shared read-only afterwards.
pub fn default_kernel() -> &'static GaussianKernel {
    &DEFAULT_KERNEL
}

/// Normalized, symmetric Gaussian weights in Q16 fixed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaussianKernel {
    radius: u32,
    weights: Vec<u32>,
}

impl GaussianKernel {
    /// Build a kernel with `2 * radius + 1` taps for the given standard deviation.
    ///
    /// Weights are normalized in floating point, rounded to Q16, and the
    /// centre tap absorbs the rounding drift so the sum is exactly
    /// [`KERNEL_SCALE`]. A non-positive `sigma` degenerates to the identity kernel.
    pub fn new(radius: u32, sigma: f64) -> Self {
        let r = radius as i64;
        let len = 2 * radius as usize + 1;

        if sigma <= 0.0 || radius == 0 {
            let mut weights = vec![0; len];
            weights[radius as usize] = KERNEL_SCALE;
            return Self { radius, weights };
        }

        let two_sigma_sq = 2.0 * sigma * sigma;
        let raw: Vec<f64> = (-r..=r)
            .map(|i| (-((i * i) as f64) / two_sigma_sq).exp())
            .collect();
        let total: f64 = raw.iter().sum();

        let mut weights: Vec<u32> = raw
            .iter()
            .map(|w| (w / total * KERNEL_SCALE as f64).round() as u32)
            .collect();

        let sum: i64 = weights.iter().map(|&w| w as i64).sum();
        let centre = radius as usize;
        weights[centre] = (weights[centre] as i64 + KERNEL_SCALE as i64 - sum) as u32;

        Self { radius, weights }
    }

    /// Number of samples on each side of the centre tap.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// The Q16 weights, ordered from `-radius` to `+radius`.
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    /// Number of taps (`2 * radius + 1`).
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false; a kernel has at least the centre tap.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
