// ============================================================================
// TRANSFORM OPERATIONS — rotate, flip, resize
// ============================================================================

use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::error::{EditorError, Result};

/// Clockwise rotation amount. Anything else is rejected at the session
/// boundary before reaching this layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationAngle {
    Cw90,
    Cw180,
    Cw270,
}

impl RotationAngle {
    /// Parse a degree value from the command surface.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            90 => Some(RotationAngle::Cw90),
            180 => Some(RotationAngle::Cw180),
            270 => Some(RotationAngle::Cw270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            RotationAngle::Cw90 => 90,
            RotationAngle::Cw180 => 180,
            RotationAngle::Cw270 => 270,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

impl FlipAxis {
    pub fn label(self) -> &'static str {
        match self {
            FlipAxis::Horizontal => "horizontal",
            FlipAxis::Vertical => "vertical",
        }
    }
}

/// Rotate clockwise by a right-angle multiple. 90/270 swap width and height.
pub fn rotate(buf: &PixelBuffer, angle: RotationAngle) -> PixelBuffer {
    if buf.is_empty() {
        return buf.clone();
    }
    let w = buf.width();
    let h = buf.height();
    match angle {
        // dst(x, y) = src(y, h-1-x)
        RotationAngle::Cw90 => remap(buf, h, w, |dx, dy| (dy, h - 1 - dx)),
        // dst(x, y) = src(w-1-x, h-1-y)
        RotationAngle::Cw180 => remap(buf, w, h, |dx, dy| (w - 1 - dx, h - 1 - dy)),
        // dst(x, y) = src(w-1-y, x)
        RotationAngle::Cw270 => remap(buf, h, w, |dx, dy| (w - 1 - dy, dx)),
    }
}

/// Mirror along the given axis.
pub fn flip(buf: &PixelBuffer, axis: FlipAxis) -> PixelBuffer {
    if buf.is_empty() {
        return buf.clone();
    }
    let w = buf.width();
    let h = buf.height();
    match axis {
        FlipAxis::Horizontal => remap(buf, w, h, |dx, dy| (w - 1 - dx, dy)),
        FlipAxis::Vertical => remap(buf, w, h, |dx, dy| (dx, h - 1 - dy)),
    }
}

/// Build a new buffer of `dst_w`×`dst_h` where every destination pixel is
/// copied whole from the source coordinate given by `src_of`.
fn remap<F>(src: &PixelBuffer, dst_w: u32, dst_h: u32, src_of: F) -> PixelBuffer
where
    F: Fn(u32, u32) -> (u32, u32) + Sync,
{
    let cc = src.channels().count();
    let src_raw = src.data();
    let src_stride = src.stride();
    let dst_stride = dst_w as usize * cc;
    let mut dst_raw = vec![0u8; dst_stride * dst_h as usize];

    dst_raw
        .par_chunks_mut(dst_stride)
        .enumerate()
        .for_each(|(dy, row_out)| {
            for dx in 0..dst_w {
                let (sx, sy) = src_of(dx, dy as u32);
                let si = sy as usize * src_stride + sx as usize * cc;
                let di = dx as usize * cc;
                row_out[di..di + cc].copy_from_slice(&src_raw[si..si + cc]);
            }
        });

    PixelBuffer::from_raw(dst_w, dst_h, src.channels(), dst_raw).unwrap()
}

/// Resample to exact target dimensions.
///
/// Shrinking uses pixel-coverage area averaging; enlarging on both axes uses
/// center-aligned bilinear sampling. Zero targets fail with
/// `InvalidParameter` and leave the input untouched.
pub fn resize(buf: &PixelBuffer, new_w: u32, new_h: u32) -> Result<PixelBuffer> {
    if new_w == 0 || new_h == 0 {
        return Err(EditorError::InvalidParameter(format!(
            "resize target must be positive, got {}x{}",
            new_w, new_h
        )));
    }
    if buf.is_empty() {
        return Ok(buf.clone());
    }
    if new_w == buf.width() && new_h == buf.height() {
        return Ok(buf.clone());
    }
    if new_w >= buf.width() && new_h >= buf.height() {
        Ok(resample_bilinear(buf, new_w, new_h))
    } else {
        Ok(resample_area(buf, new_w, new_h))
    }
}

/// Area-averaging resample: each destination pixel averages the source
/// rectangle it covers, weighting boundary pixels by fractional overlap.
fn resample_area(src: &PixelBuffer, new_w: u32, new_h: u32) -> PixelBuffer {
    let cc = src.channels().count();
    let src_w = src.width() as usize;
    let src_h = src.height() as usize;
    let src_raw = src.data();
    let src_stride = src.stride();

    let x_ratio = src_w as f64 / new_w as f64;
    let y_ratio = src_h as f64 / new_h as f64;

    let dst_stride = new_w as usize * cc;
    let mut dst_raw = vec![0u8; dst_stride * new_h as usize];

    dst_raw
        .par_chunks_mut(dst_stride)
        .enumerate()
        .for_each(|(dy, row_out)| {
            let y0 = dy as f64 * y_ratio;
            let y1 = (dy as f64 + 1.0) * y_ratio;
            let sy0 = y0.floor() as usize;
            let sy1 = (y1.ceil() as usize).min(src_h);

            for dx in 0..new_w as usize {
                let x0 = dx as f64 * x_ratio;
                let x1 = (dx as f64 + 1.0) * x_ratio;
                let sx0 = x0.floor() as usize;
                let sx1 = (x1.ceil() as usize).min(src_w);

                let mut acc = [0.0f64; 3];
                for sy in sy0..sy1 {
                    let wy = (y1.min(sy as f64 + 1.0) - y0.max(sy as f64)).max(0.0);
                    let row_in = &src_raw[sy * src_stride..(sy + 1) * src_stride];
                    for sx in sx0..sx1 {
                        let wx = (x1.min(sx as f64 + 1.0) - x0.max(sx as f64)).max(0.0);
                        let weight = wx * wy;
                        let pi = sx * cc;
                        for c in 0..cc {
                            acc[c] += row_in[pi + c] as f64 * weight;
                        }
                    }
                }

                let area = (x1 - x0) * (y1 - y0);
                let di = dx * cc;
                for c in 0..cc {
                    row_out[di + c] = (acc[c] / area).round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    PixelBuffer::from_raw(new_w, new_h, src.channels(), dst_raw).unwrap()
}

/// Center-aligned bilinear resample, clamping samples to the image border.
fn resample_bilinear(src: &PixelBuffer, new_w: u32, new_h: u32) -> PixelBuffer {
    let cc = src.channels().count();
    let src_w = src.width() as isize;
    let src_h = src.height() as isize;
    let src_raw = src.data();
    let src_stride = src.stride();

    let x_ratio = src.width() as f64 / new_w as f64;
    let y_ratio = src.height() as f64 / new_h as f64;

    let dst_stride = new_w as usize * cc;
    let mut dst_raw = vec![0u8; dst_stride * new_h as usize];

    dst_raw
        .par_chunks_mut(dst_stride)
        .enumerate()
        .for_each(|(dy, row_out)| {
            let sy = ((dy as f64 + 0.5) * y_ratio - 0.5).max(0.0);
            let y0 = (sy.floor() as isize).min(src_h - 1);
            let y1 = (y0 + 1).min(src_h - 1);
            let fy = sy - y0 as f64;

            for dx in 0..new_w as usize {
                let sx = ((dx as f64 + 0.5) * x_ratio - 0.5).max(0.0);
                let x0 = (sx.floor() as isize).min(src_w - 1);
                let x1 = (x0 + 1).min(src_w - 1);
                let fx = sx - x0 as f64;

                let i00 = y0 as usize * src_stride + x0 as usize * cc;
                let i01 = y0 as usize * src_stride + x1 as usize * cc;
                let i10 = y1 as usize * src_stride + x0 as usize * cc;
                let i11 = y1 as usize * src_stride + x1 as usize * cc;

                let di = dx * cc;
                for c in 0..cc {
                    let top = src_raw[i00 + c] as f64 * (1.0 - fx) + src_raw[i01 + c] as f64 * fx;
                    let bottom =
                        src_raw[i10 + c] as f64 * (1.0 - fx) + src_raw[i11 + c] as f64 * fx;
                    let v = top * (1.0 - fy) + bottom * fy;
                    row_out[di + c] = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    PixelBuffer::from_raw(new_w, new_h, src.channels(), dst_raw).unwrap()
}
