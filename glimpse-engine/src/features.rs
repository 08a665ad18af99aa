//! Corner detection and local descriptors.
//!
//! Pipeline: decode, optional downscale, grayscale, Gaussian blur (denoise),
//! Sobel gradients, Harris response over a 3x3 window, 3x3 non-maximum
//! suppression, then a 4x4x8 gradient orientation histogram per keypoint
//! (128 values, the same length as SIFT descriptors).
//!
//! Everything here is synchronous and CPU bound. Callers run it on the
//! blocking pool.

use std::f32::consts::PI;

use glimpse_core::AnalysisError;
use image::{imageops, DynamicImage, GrayImage};
use serde_json::{json, Value};

use crate::config::DetectorConfig;

/// Length of each descriptor vector.
pub const DESCRIPTOR_LEN: usize = 128;

const PATCH_RADIUS: i64 = 8;
const CELLS: usize = 4;
const CELL_SIZE: i64 = 4;
const BINS: usize = 8;
const DESCRIPTOR_CLAMP: f32 = 0.2;

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has zero width or height")]
    EmptyImage,
}

impl From<DetectError> for AnalysisError {
    fn from(e: DetectError) -> Self {
        AnalysisError::UnsupportedImage(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: u32,
    pub y: u32,
    pub response: f32,
}

/// Detected keypoints with one descriptor each.
#[derive(Debug, Clone)]
pub struct Features {
    pub width: u32,
    pub height: u32,
    /// Sorted by descending response.
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<[f32; DESCRIPTOR_LEN]>,
}

impl Features {
    /// `(rows, cols)` of the descriptor matrix; `(0, 0)` when nothing was found.
    pub fn descriptor_shape(&self) -> (usize, usize) {
        if self.descriptors.is_empty() {
            (0, 0)
        } else {
            (self.descriptors.len(), DESCRIPTOR_LEN)
        }
    }

    /// JSON payload returned to clients and cached.
    pub fn summary(&self) -> Value {
        let (rows, cols) = self.descriptor_shape();
        json!({
            "keypoints": self.keypoints.len(),
            "descriptors": [rows, cols],
        })
    }
}

/// Decode `data` and detect features.
pub fn detect_from_bytes(data: &[u8], config: &DetectorConfig) -> Result<Features, DetectError> {
    let img = image::load_from_memory(data)?;
    detect(&img, config)
}

/// Detect features in an already decoded image.
pub fn detect(img: &DynamicImage, config: &DetectorConfig) -> Result<Features, DetectError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(DetectError::EmptyImage);
    }

    let gray = if img.width() > config.max_dimension || img.height() > config.max_dimension {
        img.resize(
            config.max_dimension,
            config.max_dimension,
            imageops::FilterType::Triangle,
        )
        .to_luma8()
    } else {
        img.to_luma8()
    };

    let gray: GrayImage = if config.blur_sigma > 0.0 {
        imageops::blur(&gray, config.blur_sigma)
    } else {
        gray
    };

    let (width, height) = gray.dimensions();
    let grid = Grid {
        w: width as usize,
        h: height as usize,
    };
    let pixels: Vec<f32> = gray.as_raw().iter().map(|&p| p as f32 / 255.0).collect();

    let (gx, gy) = sobel(&pixels, grid);
    let response = harris_response(&gx, &gy, grid, config.harris_k);
    let keypoints = non_max_suppression(&response, grid, config.threshold);
    let descriptors = keypoints
        .iter()
        .map(|kp| describe(&gx, &gy, grid, kp))
        .collect();

    Ok(Features {
        width,
        height,
        keypoints,
        descriptors,
    })
}

#[derive(Debug, Clone, Copy)]
struct Grid {
    w: usize,
    h: usize,
}

impl Grid {
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn clamped_idx(&self, x: i64, y: i64) -> usize {
        let x = x.clamp(0, self.w as i64 - 1) as usize;
        let y = y.clamp(0, self.h as i64 - 1) as usize;
        self.idx(x, y)
    }
}

fn sobel(p: &[f32], g: Grid) -> (Vec<f32>, Vec<f32>) {
    let mut gx = vec![0.0f32; g.w * g.h];
    let mut gy = vec![0.0f32; g.w * g.h];
    if g.w < 3 || g.h < 3 {
        return (gx, gy);
    }

    for y in 1..g.h - 1 {
        for x in 1..g.w - 1 {
            let tl = p[g.idx(x - 1, y - 1)];
            let tc = p[g.idx(x, y - 1)];
            let tr = p[g.idx(x + 1, y - 1)];
            let ml = p[g.idx(x - 1, y)];
            let mr = p[g.idx(x + 1, y)];
            let bl = p[g.idx(x - 1, y + 1)];
            let bc = p[g.idx(x, y + 1)];
            let br = p[g.idx(x + 1, y + 1)];

            let i = g.idx(x, y);
            gx[i] = (tr + 2.0 * mr + br) - (tl + 2.0 * ml + bl);
            gy[i] = (bl + 2.0 * bc + br) - (tl + 2.0 * tc + tr);
        }
    }
    (gx, gy)
}

fn harris_response(gx: &[f32], gy: &[f32], g: Grid, k: f32) -> Vec<f32> {
    let mut r = vec![0.0f32; g.w * g.h];
    if g.w < 5 || g.h < 5 {
        return r;
    }

    for y in 2..g.h - 2 {
        for x in 2..g.w - 2 {
            let (mut sxx, mut syy, mut sxy) = (0.0f32, 0.0f32, 0.0f32);
            for wy in y - 1..=y + 1 {
                for wx in x - 1..=x + 1 {
                    let i = g.idx(wx, wy);
                    sxx += gx[i] * gx[i];
                    syy += gy[i] * gy[i];
                    sxy += gx[i] * gy[i];
                }
            }
            let det = sxx * syy - sxy * sxy;
            let trace = sxx + syy;
            r[g.idx(x, y)] = det - k * trace * trace;
        }
    }
    r
}

fn non_max_suppression(r: &[f32], g: Grid, relative_threshold: f32) -> Vec<Keypoint> {
    let max = r.iter().copied().fold(0.0f32, f32::max);
    if max <= f32::EPSILON || g.w < 3 || g.h < 3 {
        return Vec::new();
    }
    let threshold = max * relative_threshold;

    let mut keypoints = Vec::new();
    for y in 1..g.h - 1 {
        for x in 1..g.w - 1 {
            let v = r[g.idx(x, y)];
            if v <= threshold {
                continue;
            }

            let mut is_peak = true;
            'window: for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let n = r[g.idx((x as i64 + dx) as usize, (y as i64 + dy) as usize)];
                    // Ties go to the neighbour earlier in scan order.
                    let earlier = dy < 0 || (dy == 0 && dx < 0);
                    if n > v || (n == v && earlier) {
                        is_peak = false;
                        break 'window;
                    }
                }
            }

            if is_peak {
                keypoints.push(Keypoint {
                    x: x as u32,
                    y: y as u32,
                    response: v,
                });
            }
        }
    }

    keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
    keypoints
}

fn describe(gx: &[f32], gy: &[f32], g: Grid, kp: &Keypoint) -> [f32; DESCRIPTOR_LEN] {
    let mut hist = [0.0f32; DESCRIPTOR_LEN];
    let (cx, cy) = (kp.x as i64, kp.y as i64);

    for py in 0..2 * PATCH_RADIUS {
        for px in 0..2 * PATCH_RADIUS {
            let i = g.clamped_idx(cx - PATCH_RADIUS + px, cy - PATCH_RADIUS + py);
            let (dx, dy) = (gx[i], gy[i]);
            let magnitude = (dx * dx + dy * dy).sqrt();
            if magnitude == 0.0 {
                continue;
            }

            let angle = dy.atan2(dx) + PI;
            let bin = ((angle / (2.0 * PI) * BINS as f32) as usize).min(BINS - 1);
            let cell_y = (py / CELL_SIZE) as usize;
            let cell_x = (px / CELL_SIZE) as usize;
            hist[(cell_y * CELLS + cell_x) * BINS + bin] += magnitude;
        }
    }

    normalize(&mut hist);
    for v in hist.iter_mut() {
        *v = v.min(DESCRIPTOR_CLAMP);
    }
    normalize(&mut hist);
    hist
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Synthetic image with four strong corners, used for warmup.
pub fn calibration_image() -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(64, 64, |x, y| {
        let inside = (16..48).contains(&x) && (16..48).contains(&y);
        image::Luma([if inside { 255 } else { 0 }])
    }))
}
