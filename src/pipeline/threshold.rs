//! Fixed-threshold binarization.

use image::GrayImage;
use rayon::prelude::*;

/// Output sample for values strictly above the threshold.
pub const WHITE: u8 = 255;

/// Output sample for values at or below the threshold.
pub const BLACK: u8 = 0;

/// Binarize one sample: `255` if `value > threshold`, else `0`.
#[inline]
pub fn binarize_sample(value: u8, threshold: u8) -> u8 {
    if value > threshold {
        WHITE
    } else {
        BLACK
    }
}

/// Binarize every sample of `image` in place.
pub fn binarize(image: &mut GrayImage, threshold: u8) {
    image
        .par_iter_mut()
        .for_each(|v| *v = binarize_sample(*v, threshold));
}
