// ============================================================================
// ADJUSTMENT OPERATIONS — grayscale, brightness, contrast
// ============================================================================

use rayon::prelude::*;

use crate::buffer::{Channels, PixelBuffer};

/// Apply a per-sample transform in f32, quantizing back to 8-bit with
/// clamping. Channel count and dimensions are preserved.
fn apply_sample_transform<F>(buf: &PixelBuffer, transform: F) -> PixelBuffer
where
    F: Fn(f32) -> f32 + Sync,
{
    if buf.is_empty() {
        return buf.clone();
    }
    let stride = buf.stride();
    let src_raw = buf.data();
    let mut dst_raw = vec![0u8; src_raw.len()];

    dst_raw
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &src_raw[y * stride..(y + 1) * stride];
            for (out, &v) in row_out.iter_mut().zip(row_in) {
                *out = transform(v as f32).round().clamp(0.0, 255.0) as u8;
            }
        });

    PixelBuffer::from_raw(buf.width(), buf.height(), buf.channels(), dst_raw).unwrap()
}

/// Convert to single-channel luma. Idempotent on gray input.
///
/// Uses the BT.601 weights 0.299 R + 0.587 G + 0.114 B.
pub fn grayscale(buf: &PixelBuffer) -> PixelBuffer {
    if buf.is_empty() || buf.channels() == Channels::Gray {
        return buf.clone();
    }
    let w = buf.width() as usize;
    let src_raw = buf.data();
    let src_stride = buf.stride();
    let mut dst_raw = vec![0u8; w * buf.height() as usize];

    dst_raw
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &src_raw[y * src_stride..(y + 1) * src_stride];
            for x in 0..w {
                let pi = x * 3;
                let r = row_in[pi] as f32;
                let g = row_in[pi + 1] as f32;
                let b = row_in[pi + 2] as f32;
                row_out[x] = (0.299 * r + 0.587 * g + 0.114 * b)
                    .round()
                    .clamp(0.0, 255.0) as u8;
            }
        });

    PixelBuffer::from_raw(buf.width(), buf.height(), Channels::Gray, dst_raw).unwrap()
}

/// Additive brightness: `clamp(sample + delta, 0, 255)` per sample.
pub fn brightness(buf: &PixelBuffer, delta: i32) -> PixelBuffer {
    let d = delta as f32;
    apply_sample_transform(buf, move |v| v + d)
}

/// Contrast around the midpoint: `clamp(128 + factor * (sample - 128), 0, 255)`.
pub fn contrast(buf: &PixelBuffer, factor: f32) -> PixelBuffer {
    apply_sample_transform(buf, move |v| 128.0 + factor * (v - 128.0))
}
