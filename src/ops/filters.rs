// ============================================================================
// SMOOTHING FILTERS — separable Gaussian blur
// ============================================================================

use rayon::prelude::*;

use crate::buffer::PixelBuffer;

/// Blur strength `intensity` maps to an odd kernel window of size
/// `2 * intensity + 1`, so strength and kernel width grow together and the
/// kernel is always valid. Intensity 0 is a no-op.
///
/// Sigma follows the OpenCV convention for an automatic sigma:
/// `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_blur(buf: &PixelBuffer, intensity: u32) -> PixelBuffer {
    if buf.is_empty() || intensity == 0 {
        return buf.clone();
    }

    let kernel = build_kernel(intensity as usize);
    let radius = intensity as isize;
    let cc = buf.channels().count();
    let w = buf.width() as usize;
    let h = buf.height() as usize;
    let stride = w * cc;

    // Work in f32 throughout; quantize once at the end.
    let buf_in: Vec<f32> = buf.data().iter().map(|&v| v as f32).collect();

    // Horizontal pass, parallel by row.
    let mut buf_h = vec![0.0f32; buf_in.len()];
    buf_h
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &buf_in[y * stride..(y + 1) * stride];
            for x in 0..w {
                for c in 0..cc {
                    let mut acc = 0.0f32;
                    for (ki, &kv) in kernel.iter().enumerate() {
                        let sx = (x as isize + ki as isize - radius).clamp(0, w as isize - 1);
                        acc += row_in[sx as usize * cc + c] * kv;
                    }
                    row_out[x * cc + c] = acc;
                }
            }
        });

    // Vertical pass, parallel by row.
    let mut buf_v = vec![0.0f32; buf_in.len()];
    buf_v
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            for x in 0..w {
                for c in 0..cc {
                    let mut acc = 0.0f32;
                    for (ki, &kv) in kernel.iter().enumerate() {
                        let sy = (y as isize + ki as isize - radius).clamp(0, h as isize - 1);
                        acc += buf_h[sy as usize * stride + x * cc + c] * kv;
                    }
                    row_out[x * cc + c] = acc;
                }
            }
        });

    let dst_raw: Vec<u8> = buf_v
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    PixelBuffer::from_raw(buf.width(), buf.height(), buf.channels(), dst_raw).unwrap()
}

/// Normalized 1-D Gaussian kernel with the given radius (window `2r + 1`).
fn build_kernel(radius: usize) -> Vec<f32> {
    let k = 2 * radius + 1;
    let sigma = 0.3 * ((k - 1) as f32 * 0.5 - 1.0) + 0.8;
    let s2 = 2.0 * sigma * sigma;

    let mut kernel = vec![0.0f32; k];
    let mut sum = 0.0f32;
    for (i, v) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *v = (-x * x / s2).exp();
        sum += *v;
    }
    let inv = 1.0 / sum;
    for v in &mut kernel {
        *v *= inv;
    }
    kernel
}
