//! Separable Gaussian blur on a luminance plane.
//!
//! Two passes over the image: horizontal into a Q16 `u32` plane, then
//! vertical back to `u8` with round-half-up. Samples outside the image are
//! replaced by the nearest edge sample (clamp-to-edge) in both passes.
//!
//! Rows are independent within each pass and run on the rayon pool.

use image::GrayImage;
use rayon::prelude::*;

use super::kernel::{GaussianKernel, KERNEL_FRACTION_BITS};

// Rounding bias for the final shift out of Q32 (Q16 x Q16).
const ROUND_HALF: u64 = 1 << (2 * KERNEL_FRACTION_BITS - 1);

/// Index of the edge-replicated sample `offset` taps away from `centre`.
#[inline]
fn clamp_index(centre: usize, offset: isize, len: usize) -> usize {
    let idx = centre as isize + offset;
    idx.clamp(0, len as isize - 1) as usize
}

/// Blur `src` with `kernel`, producing a new plane of the same size.
pub fn gaussian_blur(src: &GrayImage, kernel: &GaussianKernel) -> GrayImage {
    let (width, height) = src.dimensions();
    if width == 0 || height == 0 {
        return src.clone();
    }

    let w = width as usize;
    let h = height as usize;
    let radius = kernel.radius() as isize;
    let weights = kernel.weights();
    let samples = src.as_raw();

    let mut horizontal = vec![0u32; w * h];
    horizontal
        .par_chunks_mut(w)
        .zip(samples.par_chunks(w))
        .for_each(|(dst, row)| {
            for (x, out) in dst.iter_mut().enumerate() {
                let mut acc = 0u32;
                for (k, &weight) in weights.iter().enumerate() {
                    let sx = clamp_index(x, k as isize - radius, w);
                    acc += row[sx] as u32 * weight;
                }
                *out = acc;
            }
        });

    let mut blurred = GrayImage::new(width, height);
    blurred
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, dst)| {
            for (x, out) in dst.iter_mut().enumerate() {
                let mut acc = 0u64;
                for (k, &weight) in weights.iter().enumerate() {
                    let sy = clamp_index(y, k as isize - radius, h);
                    acc += horizontal[sy * w + x] as u64 * weight as u64;
                }
                *out = ((acc + ROUND_HALF) >> (2 * KERNEL_FRACTION_BITS)) as u8;
            }
        });

    blurred
}
