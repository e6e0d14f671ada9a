//! Test utilities for integration tests.
//!
//! Image builders, a hand-rolled multipart encoder for `oneshot` requests,
//! and a helper that runs a real worker on a loopback port.

use std::io::Cursor;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};

use binarize_worker::{create_router, ImageProcessor, RouterConfig};

pub const BOUNDARY: &str = "binarize-test-boundary-7f3a";

// =============================================================================
// Image Builders
// =============================================================================

/// Encode any image in the given container format.
pub fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

/// A solid RGB PNG.
pub fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color))),
        ImageFormat::Png,
    )
}

/// A grayscale PNG built from a per-pixel function.
pub fn gray_png<F>(width: u32, height: u32, f: F) -> Vec<u8>
where
    F: Fn(u32, u32) -> u8,
{
    encode(
        DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| Luma([f(x, y)]))),
        ImageFormat::Png,
    )
}

/// Black/white checkerboard with square cells; the top-left cell is white.
pub fn checkerboard_png(width: u32, height: u32, cell: u32) -> Vec<u8> {
    gray_png(width, height, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            255
        } else {
            0
        }
    })
}

/// Deterministic RGB noise (xorshift), incompressible enough to make large bodies.
pub fn noise_png(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut state = seed.max(1);
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xFF) as u8
        };
        Rgb([next(), next(), next()])
    });
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

/// A gradient JPEG.
pub fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    });
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, 90);
    encoder.encode_image(&img).unwrap();
    buf
}

/// Decode a response body as an 8-bit grayscale plane.
pub fn decode_gray(data: &[u8]) -> GrayImage {
    image::load_from_memory(data).unwrap().into_luma8()
}

/// Render a binary plane as rows of `#` (255) and `.` (0).
pub fn render(img: &GrayImage) -> Vec<String> {
    img.rows()
        .map(|row| {
            row.map(|p| match p[0] {
                255 => '#',
                0 => '.',
                _ => '?',
            })
            .collect()
        })
        .collect()
}

/// True if the data starts with the PNG signature.
pub fn is_valid_png(data: &[u8]) -> bool {
    data.len() >= 8 && &data[..8] == b"\x89PNG\r\n\x1a\n"
}

// =============================================================================
// Requests
// =============================================================================

/// Build a multipart/form-data body from `(field name, bytes)` pairs.
pub fn multipart_body(fields: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, data) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.bin\"\r\n",
                name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// `POST /process` with a multipart body.
pub fn process_request(fields: &[(&str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap()
}

/// `POST /process` with the image as the only `image` field.
pub fn image_request(image: &[u8]) -> Request<Body> {
    process_request(&[("image", image)])
}

/// Router with default processor and tracing off.
pub fn test_router() -> Router {
    create_router(ImageProcessor::new(), RouterConfig::new().with_tracing(false))
}

// =============================================================================
// Live Server
// =============================================================================

/// Serve a worker on an ephemeral loopback port and return its `/process` URL.
pub async fn spawn_worker(processor: ImageProcessor, config: RouterConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = create_router(processor, config);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}/process", addr)
}
