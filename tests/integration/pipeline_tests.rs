//! End-to-end pipeline tests through the public processor API.

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};

use binarize_worker::pipeline::{gaussian_blur, default_kernel, to_luminance};
use binarize_worker::ImageProcessor;

use super::test_utils::*;

fn binarize_bytes(input: &[u8]) -> GrayImage {
    let out = ImageProcessor::new().process(input).unwrap();
    decode_gray(&out.data)
}

#[test]
fn test_solid_white_and_black() {
    let white = binarize_bytes(&solid_png(4, 4, [255, 255, 255]));
    assert_eq!(white.dimensions(), (4, 4));
    assert!(white.pixels().all(|p| p[0] == 255));

    let black = binarize_bytes(&solid_png(4, 4, [0, 0, 0]));
    assert_eq!(black.dimensions(), (4, 4));
    assert!(black.pixels().all(|p| p[0] == 0));
}

#[test]
fn test_threshold_is_strict() {
    let at = binarize_bytes(&gray_png(5, 5, |_, _| 100));
    assert!(at.pixels().all(|p| p[0] == 0));

    let above = binarize_bytes(&gray_png(5, 5, |_, _| 101));
    assert!(above.pixels().all(|p| p[0] == 255));
}

#[test]
fn test_checkerboard_blurred_values() {
    let input = checkerboard_png(8, 8, 4);
    let gray = image::load_from_memory(&input).unwrap();
    let blurred = gaussian_blur(&to_luminance(gray), default_kernel());

    let expected: [[u8; 8]; 8] = [
        [255, 255, 241, 179, 76, 14, 0, 0],
        [255, 255, 241, 179, 76, 14, 0, 0],
        [241, 241, 229, 173, 82, 26, 14, 14],
        [179, 179, 173, 148, 107, 82, 76, 76],
        [76, 76, 82, 107, 148, 173, 179, 179],
        [14, 14, 26, 82, 173, 229, 241, 241],
        [0, 0, 14, 76, 179, 241, 255, 255],
        [0, 0, 14, 76, 179, 241, 255, 255],
    ];

    for (y, row) in expected.iter().enumerate() {
        let actual: Vec<u8> = (0..8).map(|x| blurred.get_pixel(x, y as u32)[0]).collect();
        assert_eq!(actual, row.to_vec(), "row {}", y);
    }
}

#[test]
fn test_checkerboard_snapshot() {
    let out = binarize_bytes(&checkerboard_png(8, 8, 4));

    assert_eq!(
        render(&out),
        vec![
            "####....",
            "####....",
            "####....",
            "#####...",
            "...#####",
            "....####",
            "....####",
            "....####",
        ]
    );
}

#[test]
fn test_output_is_deterministic() {
    let input = noise_png(37, 23, 99);
    let processor = ImageProcessor::new();

    let first = processor.process(&input).unwrap();
    let second = processor.process(&input).unwrap();

    assert_eq!(first.data, second.data);
}

#[test]
fn test_dimensions_and_binary_range() {
    for (w, h) in [(1, 1), (1, 17), (17, 1), (3, 2), (64, 48)] {
        let out = binarize_bytes(&noise_png(w, h, w * 31 + h));
        assert_eq!(out.dimensions(), (w, h));
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}

#[test]
fn test_input_formats_agree() {
    // Lossless formats carrying the same pixels give the same output.
    let img = RgbImage::from_fn(12, 10, |x, y| {
        if x > y {
            Rgb([240, 240, 240])
        } else {
            Rgb([20, 20, 20])
        }
    });
    let source = DynamicImage::ImageRgb8(img);

    let png = binarize_bytes(&encode(source.clone(), ImageFormat::Png));
    let bmp = binarize_bytes(&encode(source.clone(), ImageFormat::Bmp));
    let tiff = binarize_bytes(&encode(source, ImageFormat::Tiff));

    assert_eq!(png, bmp);
    assert_eq!(png, tiff);
}

#[test]
fn test_gif_input() {
    let gif = encode(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([255, 255, 255, 255]))),
        ImageFormat::Gif,
    );
    let out = binarize_bytes(&gif);
    assert_eq!(out.dimensions(), (6, 6));
    assert!(out.pixels().all(|p| p[0] == 255));
}

#[test]
fn test_alpha_is_ignored() {
    let transparent = encode(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0]))),
        ImageFormat::Png,
    );
    let out = binarize_bytes(&transparent);
    assert!(out.pixels().all(|p| p[0] == 255));
}

#[test]
fn test_output_is_fixed_point() {
    // Re-processing a binary image keeps uniform regions intact.
    let first = ImageProcessor::new()
        .process(&solid_png(9, 9, [200, 200, 200]))
        .unwrap();
    let second = binarize_bytes(&first.data);
    assert!(second.pixels().all(|p| p[0] == 255));
}

#[test]
fn test_isolated_dot_is_erased() {
    // A single white pixel blurs to 41 at its centre, below the threshold.
    let out = binarize_bytes(&gray_png(5, 5, |x, y| {
        if x == 2 && y == 2 {
            255
        } else {
            0
        }
    }));
    assert!(out.pixels().all(|p| p[0] == 0));
}

#[test]
fn test_luma_only_input_passes_through_luminance() {
    let img = GrayImage::from_fn(7, 7, |x, _| Luma([(x * 40) as u8]));
    let luminance = to_luminance(DynamicImage::ImageLuma8(img.clone()));
    assert_eq!(luminance, img);
}
