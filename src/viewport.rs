// ============================================================================
// RENDERING SURFACE — scale-to-fit presentation of the displayed image
// ============================================================================

use crate::buffer::PixelBuffer;
use crate::error::Result;
use crate::ops::transform;

/// Default viewport bounds of the preview area.
pub const DEFAULT_MAX_WIDTH: u32 = 650;
pub const DEFAULT_MAX_HEIGHT: u32 = 520;

/// Anything that can show a pixel buffer. Purely a view; holds no edit
/// state.
pub trait RenderSurface {
    fn present(&mut self, image: &PixelBuffer);
}

/// Computes the preview the surface receives: the displayed image scaled
/// down to fit a bounded viewport, aspect ratio preserved, never upscaled.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    max_width: u32,
    max_height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT)
    }
}

impl Viewport {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width: max_width.max(1),
            max_height: max_height.max(1),
        }
    }

    /// Target dimensions for an image of the given size. Images already
    /// inside the viewport keep their size; larger ones shrink uniformly so
    /// the longest overhanging edge just fits.
    pub fn fit_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width && height <= self.max_height {
            return (width, height);
        }
        let scale = (self.max_width as f64 / width as f64)
            .min(self.max_height as f64 / height as f64);
        let w = ((width as f64 * scale).round() as u32).max(1);
        let h = ((height as f64 * scale).round() as u32).max(1);
        (w.min(self.max_width), h.min(self.max_height))
    }

    /// The buffer to hand to a [`RenderSurface`].
    pub fn scaled_preview(&self, image: &PixelBuffer) -> Result<PixelBuffer> {
        if image.is_empty() {
            return Ok(image.clone());
        }
        let (w, h) = self.fit_dimensions(image.width(), image.height());
        if (w, h) == (image.width(), image.height()) {
            return Ok(image.clone());
        }
        transform::resize(image, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    #[test]
    fn small_images_are_not_upscaled() {
        let vp = Viewport::default();
        assert_eq!(vp.fit_dimensions(100, 50), (100, 50));
        assert_eq!(vp.fit_dimensions(650, 520), (650, 520));
    }

    #[test]
    fn large_images_shrink_preserving_aspect() {
        let vp = Viewport::default();
        let (w, h) = vp.fit_dimensions(1300, 520);
        assert_eq!((w, h), (650, 260));
        let (w, h) = vp.fit_dimensions(1000, 2080);
        assert_eq!((w, h), (250, 520));
    }

    #[test]
    fn extreme_aspect_ratios_never_collapse_to_zero() {
        let vp = Viewport::default();
        let (w, h) = vp.fit_dimensions(100_000, 10);
        assert!(w >= 1 && h >= 1);
        assert!(w <= 650 && h <= 520);
    }

    #[test]
    fn preview_of_fitting_image_is_the_image() {
        let vp = Viewport::default();
        let buf = PixelBuffer::from_raw(30, 20, Channels::Gray, vec![9; 600]).unwrap();
        assert_eq!(vp.scaled_preview(&buf).unwrap(), buf);
    }
}
