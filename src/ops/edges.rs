// ============================================================================
// EDGE DETECTION — Sobel gradients, non-maximum suppression, hysteresis
// ============================================================================
//
// Canny-style two-threshold detector. Destructive relative to the adjustment
// pipeline: the result is a 1-channel binary buffer that loses color and
// fine tonal information.

use crate::buffer::{Channels, PixelBuffer};
use crate::ops::adjustments;

/// Default thresholds for the command surface.
pub const DEFAULT_LOW_THRESHOLD: f32 = 100.0;
pub const DEFAULT_HIGH_THRESHOLD: f32 = 200.0;

const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Gradient magnitude comparison neighbors for the 4-bin quantized direction.
const TAN_22_5_DEG: f32 = 0.414_213_56;

/// Two-threshold gradient edge detector.
///
/// Grayscale-converts 3-channel input first. Pixels whose suppressed L1
/// gradient magnitude exceeds `high` seed edges; pixels above `low` join an
/// edge when 8-connected to a seed. Output samples are 0 or 255. The outer
/// 1-pixel frame is never an edge.
pub fn edge_detect(buf: &PixelBuffer, low: f32, high: f32) -> PixelBuffer {
    if buf.is_empty() {
        return buf.clone();
    }
    let gray = adjustments::grayscale(buf);
    let w = gray.width() as usize;
    let h = gray.height() as usize;
    let mut out = PixelBuffer::new(gray.width(), gray.height(), Channels::Gray);
    if w < 3 || h < 3 {
        return out;
    }

    let (gx, gy, mag) = sobel_gradients(&gray);
    let suppressed = suppress_non_maxima(&gx, &gy, &mag, w, h);
    hysteresis(&suppressed, w, h, low, high, out.data_mut());
    out
}

/// 3×3 Sobel convolution with border clamping; magnitude is the L1 norm
/// `|gx| + |gy|` (the OpenCV Canny default).
fn sobel_gradients(gray: &PixelBuffer) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let w = gray.width() as usize;
    let h = gray.height() as usize;
    let src = gray.data();

    let mut gx = vec![0.0f32; w * h];
    let mut gy = vec![0.0f32; w * h];
    let mut mag = vec![0.0f32; w * h];

    for y in 0..h {
        let ys = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        for x in 0..w {
            let xs = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for ky in 0..3 {
                let row = ys[ky] * w;
                for kx in 0..3 {
                    let v = src[row + xs[kx]] as f32;
                    sum_x += v * SOBEL_X[ky][kx];
                    sum_y += v * SOBEL_Y[ky][kx];
                }
            }
            let idx = y * w + x;
            gx[idx] = sum_x;
            gy[idx] = sum_y;
            mag[idx] = sum_x.abs() + sum_y.abs();
        }
    }

    (gx, gy, mag)
}

/// Keep only local maxima along the quantized gradient direction. Ties are
/// broken asymmetrically (`>` before, `>=` after) so a two-pixel plateau
/// keeps exactly one pixel. The outermost frame is dropped so neighbor
/// lookups need no bounds checks.
fn suppress_non_maxima(gx: &[f32], gy: &[f32], mag: &[f32], w: usize, h: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; w * h];

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let m = mag[idx];
            if m == 0.0 {
                continue;
            }

            let dx = gx[idx];
            let dy = gy[idx];
            let abs_dx = dx.abs();
            let abs_dy = dy.abs();
            let same_sign = (dx >= 0.0 && dy >= 0.0) || (dx <= 0.0 && dy <= 0.0);

            let (n1, n2) = if abs_dx >= abs_dy {
                if abs_dy <= abs_dx * TAN_22_5_DEG {
                    (mag[idx - 1], mag[idx + 1])
                } else if same_sign {
                    (mag[idx - w + 1], mag[idx + w - 1])
                } else {
                    (mag[idx - w - 1], mag[idx + w + 1])
                }
            } else if abs_dx <= abs_dy * TAN_22_5_DEG {
                (mag[idx - w], mag[idx + w])
            } else if same_sign {
                (mag[idx - w + 1], mag[idx + w - 1])
            } else {
                (mag[idx - w - 1], mag[idx + w + 1])
            };

            if m > n1 && m >= n2 {
                out[idx] = m;
            }
        }
    }

    out
}

/// Double-threshold hysteresis: seeds above `high` are traced through
/// 8-connected neighbors above `low`.
fn hysteresis(mag: &[f32], w: usize, h: usize, low: f32, high: f32, out: &mut [u8]) {
    let mut stack: Vec<usize> = Vec::new();

    for (idx, &m) in mag.iter().enumerate() {
        if m > high && out[idx] == 0 {
            out[idx] = 255;
            stack.push(idx);

            while let Some(i) = stack.pop() {
                let x = i % w;
                let y = i / w;
                for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                        let ni = ny * w + nx;
                        if out[ni] == 0 && mag[ni] > low {
                            out[ni] = 255;
                            stack.push(ni);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    /// Left half black, right half white — a single vertical step edge.
    fn step_image(w: u32, h: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((w * h) as usize);
        for _ in 0..h {
            for x in 0..w {
                data.push(if x < w / 2 { 0 } else { 255 });
            }
        }
        PixelBuffer::from_raw(w, h, Channels::Gray, data).unwrap()
    }

    #[test]
    fn output_is_single_channel_binary() {
        let rgb = PixelBuffer::from_raw(4, 4, Channels::Rgb, vec![128; 4 * 4 * 3]).unwrap();
        let edges = edge_detect(&rgb, DEFAULT_LOW_THRESHOLD, DEFAULT_HIGH_THRESHOLD);
        assert_eq!(edges.channels(), Channels::Gray);
        assert!(edges.data().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn step_edge_is_found_along_the_boundary() {
        let img = step_image(10, 10);
        let edges = edge_detect(&img, 100.0, 200.0);
        let boundary = 10 / 2 - 1;
        let hits = (1..9)
            .filter(|&y| {
                edges.sample(boundary, y, 0) == 255 || edges.sample(boundary + 1, y, 0) == 255
            })
            .count();
        assert_eq!(hits, 8);
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = PixelBuffer::from_raw(8, 8, Channels::Gray, vec![77; 64]).unwrap();
        let edges = edge_detect(&img, 100.0, 200.0);
        assert!(edges.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn tiny_images_produce_empty_edge_maps() {
        let img = PixelBuffer::from_raw(2, 2, Channels::Gray, vec![0, 255, 255, 0]).unwrap();
        let edges = edge_detect(&img, 100.0, 200.0);
        assert_eq!((edges.width(), edges.height()), (2, 2));
        assert!(edges.data().iter().all(|&v| v == 0));
    }
}
