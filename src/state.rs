// ============================================================================
// EDIT STATE — original → base → displayed derivation
// ============================================================================
//
// `base` is the original after the geometric transforms currently in effect;
// `displayed` is `base` after the tonal adjustments, or a frozen edge-detect
// result. Geometric transforms replace `base` wholesale and re-derive
// `displayed`; adjustment changes re-derive `displayed` only.

use crate::buffer::PixelBuffer;
use crate::error::Result;
use crate::ops::adjustments;
use crate::ops::edges;
use crate::ops::filters;
use crate::ops::transform::{self, FlipAxis, RotationAngle};

/// Live tonal adjustment parameters. The view layer is a binding over this
/// struct; it never owns authoritative state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adjustments {
    /// Blur strength; kernel window is `2 * blur_level + 1`.
    pub blur_level: u32,
    /// Additive offset in [-100, 100].
    pub brightness: i32,
    /// Midpoint multiplier in [0.5, 3.0].
    pub contrast: f32,
    pub grayscale_on: bool,
}

pub const BRIGHTNESS_RANGE: (i32, i32) = (-100, 100);
pub const CONTRAST_RANGE: (f32, f32) = (0.5, 3.0);

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            blur_level: 0,
            brightness: 0,
            contrast: 1.0,
            grayscale_on: false,
        }
    }
}

/// Whether `displayed` is still derived from `base`.
///
/// Edge detection overwrites `displayed` directly; until the next geometric
/// action or reset rebuilds the pipeline, adjustment changes must not be
/// replayed against `base`. Modeling that as an explicit state makes the
/// bypass testable instead of implicit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineMode {
    /// `displayed == recompute(base, params)`.
    Live,
    /// `displayed` holds a destructive filter result.
    Frozen,
}

/// Re-derive the displayed image from a base and the adjustment parameters.
///
/// The order is a fixed contract: grayscale first (so the tonal steps act on
/// the reduced channel count), then blur, brightness, contrast — always the
/// same regardless of which parameter changed. Two calls with equal inputs
/// yield bit-identical output.
pub fn recompute(base: &PixelBuffer, params: &Adjustments) -> PixelBuffer {
    let mut out = base.clone();
    if params.grayscale_on {
        out = adjustments::grayscale(&out);
    }
    if params.blur_level > 0 {
        out = filters::gaussian_blur(&out, params.blur_level);
    }
    out = adjustments::brightness(&out, params.brightness);
    adjustments::contrast(&out, params.contrast)
}

pub struct EditState {
    original: PixelBuffer,
    base: PixelBuffer,
    displayed: PixelBuffer,
    params: Adjustments,
    mode: PipelineMode,
}

impl EditState {
    /// State for a freshly decoded image: original = base = displayed.
    pub fn new(decoded: PixelBuffer) -> Self {
        Self {
            base: decoded.clone(),
            displayed: decoded.clone(),
            original: decoded,
            params: Adjustments::default(),
            mode: PipelineMode::Live,
        }
    }

    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    pub fn base(&self) -> &PixelBuffer {
        &self.base
    }

    pub fn displayed(&self) -> &PixelBuffer {
        &self.displayed
    }

    pub fn params(&self) -> Adjustments {
        self.params
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    // -- Geometric transforms -------------------------------------------

    pub fn rotate(&mut self, angle: RotationAngle) {
        self.base = transform::rotate(&self.base, angle);
        self.rebuild_pipeline();
    }

    pub fn flip(&mut self, axis: FlipAxis) {
        self.base = transform::flip(&self.base, axis);
        self.rebuild_pipeline();
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.base = transform::resize(&self.base, width, height)?;
        self.rebuild_pipeline();
        Ok(())
    }

    /// Any geometric action returns the pipeline to Live and re-derives
    /// `displayed` from the new base.
    fn rebuild_pipeline(&mut self) {
        self.mode = PipelineMode::Live;
        self.displayed = recompute(&self.base, &self.params);
    }

    // -- Adjustment parameters ------------------------------------------

    pub fn set_blur_level(&mut self, level: u32) {
        self.params.blur_level = level;
        self.refresh_displayed();
    }

    pub fn set_brightness(&mut self, delta: i32) {
        self.params.brightness = delta.clamp(BRIGHTNESS_RANGE.0, BRIGHTNESS_RANGE.1);
        self.refresh_displayed();
    }

    pub fn set_contrast(&mut self, factor: f32) {
        self.params.contrast = factor.clamp(CONTRAST_RANGE.0, CONTRAST_RANGE.1);
        self.refresh_displayed();
    }

    pub fn set_grayscale(&mut self, on: bool) {
        self.params.grayscale_on = on;
        self.refresh_displayed();
    }

    /// While frozen, parameter writes are recorded but `displayed` stays as
    /// the destructive filter left it.
    fn refresh_displayed(&mut self) {
        if self.mode == PipelineMode::Live {
            self.displayed = recompute(&self.base, &self.params);
        }
    }

    // -- Destructive filter ---------------------------------------------

    /// Overwrite `displayed` with its own edge map, bypassing the adjustment
    /// pipeline and freezing it.
    pub fn apply_edge_detect(&mut self, low: f32, high: f32) {
        self.displayed = edges::edge_detect(&self.displayed, low, high);
        self.mode = PipelineMode::Frozen;
    }

    // -- Resets -----------------------------------------------------------

    /// Restore default parameters and re-derive from the current base.
    pub fn reset_adjustments(&mut self) {
        self.params = Adjustments::default();
        self.rebuild_pipeline();
    }

    /// Back to the image as loaded.
    pub fn reset_all(&mut self) {
        self.base = self.original.clone();
        self.params = Adjustments::default();
        self.rebuild_pipeline();
    }

    // -- Snapshot support --------------------------------------------------

    pub(crate) fn capture(&self) -> (PixelBuffer, PixelBuffer, Adjustments, PipelineMode) {
        (
            self.base.clone(),
            self.displayed.clone(),
            self.params,
            self.mode,
        )
    }

    pub(crate) fn restore(
        &mut self,
        base: PixelBuffer,
        displayed: PixelBuffer,
        params: Adjustments,
        mode: PipelineMode,
    ) {
        self.base = base;
        self.displayed = displayed;
        self.params = params;
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    fn checker(w: u32, h: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                let v = if (x + y) % 2 == 0 { 40 } else { 210 };
                data.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }
        PixelBuffer::from_raw(w, h, Channels::Rgb, data).unwrap()
    }

    #[test]
    fn recompute_is_deterministic() {
        let base = checker(16, 12);
        let params = Adjustments {
            blur_level: 2,
            brightness: 15,
            contrast: 1.4,
            grayscale_on: true,
        };
        assert_eq!(recompute(&base, &params), recompute(&base, &params));
    }

    #[test]
    fn default_params_leave_base_untouched() {
        let base = checker(6, 6);
        assert_eq!(recompute(&base, &Adjustments::default()), base);
    }

    #[test]
    fn geometric_action_rederives_displayed() {
        let mut state = EditState::new(checker(10, 4));
        state.set_brightness(30);
        state.rotate(RotationAngle::Cw90);
        assert_eq!(state.base().width(), 4);
        assert_eq!(state.base().height(), 10);
        // base carries no brightness; displayed does
        assert_eq!(
            state.displayed(),
            &recompute(state.base(), &state.params())
        );
        assert_ne!(state.displayed(), state.base());
    }

    #[test]
    fn frozen_pipeline_ignores_parameter_changes() {
        let mut state = EditState::new(checker(12, 12));
        state.apply_edge_detect(100.0, 200.0);
        assert_eq!(state.mode(), PipelineMode::Frozen);
        let frozen = state.displayed().clone();

        state.set_brightness(80);
        assert_eq!(state.displayed(), &frozen);
        assert_eq!(state.params().brightness, 80);

        // A geometric action thaws the pipeline and re-derives from base.
        state.flip(FlipAxis::Vertical);
        assert_eq!(state.mode(), PipelineMode::Live);
        assert_eq!(
            state.displayed(),
            &recompute(state.base(), &state.params())
        );
    }

    #[test]
    fn reset_all_returns_to_load_state() {
        let original = checker(8, 8);
        let mut state = EditState::new(original.clone());
        state.rotate(RotationAngle::Cw90);
        state.set_contrast(2.0);
        state.reset_all();
        assert_eq!(state.base(), &original);
        assert_eq!(state.displayed(), &original);
        assert_eq!(state.params(), Adjustments::default());
    }

    #[test]
    fn setters_clamp_into_legal_range() {
        let mut state = EditState::new(checker(4, 4));
        state.set_brightness(500);
        assert_eq!(state.params().brightness, 100);
        state.set_contrast(0.01);
        assert_eq!(state.params().contrast, 0.5);
    }
}
