//! Multi-channel to single-channel luminance conversion.

use image::{DynamicImage, GrayImage};
use rayon::prelude::*;

// BT.601 weights in Q16; they sum to 65536.
const RED_WEIGHT: u32 = 19595;
const GREEN_WEIGHT: u32 = 38470;
const BLUE_WEIGHT: u32 = 7471;

/// Luma of one RGB sample: `(19595 R + 38470 G + 7471 B + 32768) >> 16`.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * RED_WEIGHT + g as u32 * GREEN_WEIGHT + b as u32 * BLUE_WEIGHT + 0x8000) >> 16)
        as u8
}

/// Convert a decoded image to an 8-bit luminance plane of the same size.
///
/// 8-bit grayscale input is returned as-is. Everything else is first brought
/// to 8-bit RGB (alpha dropped, deeper samples scaled down) and weighted with
/// [`luma`].
pub fn to_luminance(image: DynamicImage) -> GrayImage {
    let rgb = match image {
        DynamicImage::ImageLuma8(gray) => return gray,
        other => other.to_rgb8(),
    };

    let (width, height) = rgb.dimensions();
    let mut gray = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return gray;
    }

    let row_len = width as usize;
    gray.par_chunks_mut(row_len)
        .zip(rgb.as_raw().par_chunks(row_len * 3))
        .for_each(|(dst, src)| {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(3)) {
                *out = luma(px[0], px[1], px[2]);
            }
        });

    gray
}
