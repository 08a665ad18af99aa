//! Encoded image fixtures.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma, Rgb, RgbImage};

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .expect("fixture image encoding should succeed");
    buf.into_inner()
}

/// `width x height` all-zero RGB image encoded as JPEG.
pub fn zero_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    encode(&DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

/// Grayscale checkerboard encoded as PNG; has many strong corners.
pub fn checkerboard_png(size: u32, cell: u32) -> Vec<u8> {
    let cell = cell.max(1);
    let img = image::GrayImage::from_fn(size, size, |x, y| {
        let on = ((x / cell) + (y / cell)) % 2 == 0;
        Luma([if on { 255 } else { 0 }])
    });
    encode(&DynamicImage::ImageLuma8(img), ImageFormat::Png)
}

/// Distinct PNG per `seed`: a bright square whose position depends on the seed.
pub fn patterned_png(seed: u8) -> Vec<u8> {
    let offset = 4 + u32::from(seed % 16);
    let img = RgbImage::from_fn(48, 48, |x, y| {
        let inside = (offset..offset + 20).contains(&x) && (offset..offset + 20).contains(&y);
        if inside {
            Rgb([255, 255 - seed, seed])
        } else {
            Rgb([0, 0, 0])
        }
    });
    encode(&DynamicImage::ImageRgb8(img), ImageFormat::Png)
}
