// ============================================================================
// EDITOR SESSION — binds user actions to edit state + history bookkeeping
// ============================================================================
//
// Commit policy:
//   * Discrete actions (rotate, flip, resize, grayscale toggle, edge-detect,
//     reset-adjustments) mutate and then commit exactly one snapshot.
//   * Continuous actions (blur/brightness/contrast) recompute the displayed
//     image live on every tick; a whole slider gesture collapses into one
//     snapshot, committed at gesture release. A setter called outside any
//     gesture commits immediately.
//   * Full reset clears the history and starts a fresh floor entry, exactly
//     like an image load.
//
// The top of the undo stack is always the current committed state, so undo
// pops it aside and restores the entry beneath.

use std::path::{Path, PathBuf};

use crate::buffer::PixelBuffer;
use crate::error::{EditorError, Result};
use crate::history::{HistoryStack, Snapshot};
use crate::io;
use crate::log_info;
use crate::ops::transform::{FlipAxis, RotationAngle};
use crate::state::{Adjustments, EditState, BRIGHTNESS_RANGE, CONTRAST_RANGE};
use crate::viewport::{RenderSurface, Viewport};

/// Reentrancy guard for snapshot restore.
///
/// When undo/redo programmatically moves the sliders, the resulting
/// parameter-change notifications must not trigger recomputes or commits;
/// while `Restoring`, every parameter setter is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionMode {
    Interactive,
    Restoring,
}

/// An in-progress slider drag. Created by `begin_adjustment`, collapsed into
/// a single history entry by `end_adjustment`.
struct Gesture {
    label: String,
    changed: bool,
}

pub struct EditorSession {
    state: Option<EditState>,
    history: HistoryStack,
    mode: SessionMode,
    gesture: Option<Gesture>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            state: None,
            history: HistoryStack::new(),
            mode: SessionMode::Interactive,
            gesture: None,
            path: None,
            dirty: false,
        }
    }

    // -- Document lifecycle ---------------------------------------------

    /// Decode a file and make it the session's document.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let decoded = io::decode(path)?;
        let (w, h) = (decoded.width(), decoded.height());
        self.load_buffer(decoded);
        self.path = Some(path.to_path_buf());
        log_info!("opened {} ({}x{})", path.display(), w, h);
        Ok(())
    }

    /// Start a session from an in-memory buffer (no file path attached).
    pub fn load_buffer(&mut self, decoded: PixelBuffer) {
        self.state = Some(EditState::new(decoded));
        self.history.clear();
        self.gesture = None;
        self.path = None;
        self.commit("Open");
        self.dirty = false;
    }

    /// Encode the displayed image to the path the document was opened from.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self.path.clone().ok_or(EditorError::NoSavePath)?;
        self.save_as(&path)?;
        Ok(path)
    }

    /// Encode the displayed image to `path` and make it the session path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let state = self.state.as_ref().ok_or(EditorError::NoImage)?;
        io::encode(state.displayed(), path)?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        log_info!("saved {}", path.display());
        Ok(())
    }

    // -- Discrete actions -----------------------------------------------

    /// Rotate clockwise. Only 90, 180 and 270 are meaningful; anything else
    /// is rejected here, before it reaches the filter engine.
    pub fn rotate(&mut self, degrees: i64) -> Result<()> {
        let angle = RotationAngle::from_degrees(degrees).ok_or_else(|| {
            EditorError::InvalidParameter(format!(
                "unsupported rotation angle {degrees} (expected 90, 180 or 270)"
            ))
        })?;
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        state.rotate(angle);
        self.commit(&format!("Rotate {}°", angle.degrees()));
        Ok(())
    }

    pub fn flip(&mut self, axis: FlipAxis) -> Result<()> {
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        state.flip(axis);
        self.commit(&format!("Flip {}", axis.label()));
        Ok(())
    }

    /// Resize to exact dimensions. Non-positive targets abort the action
    /// with `InvalidParameter`; nothing is mutated and nothing is committed.
    pub fn resize(&mut self, width: i64, height: i64) -> Result<()> {
        if width <= 0 || height <= 0 || width > u32::MAX as i64 || height > u32::MAX as i64 {
            return Err(EditorError::InvalidParameter(format!(
                "resize dimensions must be positive, got {width}x{height}"
            )));
        }
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        state.resize(width as u32, height as u32)?;
        self.commit(&format!("Resize {width}x{height}"));
        Ok(())
    }

    /// Grayscale is a toggle and commits as a discrete step, unlike the
    /// slider-driven adjustments.
    pub fn toggle_grayscale(&mut self) -> Result<()> {
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        let on = !state.params().grayscale_on;
        state.set_grayscale(on);
        self.commit(if on { "Grayscale on" } else { "Grayscale off" });
        Ok(())
    }

    /// Destructive edge detection on the displayed image.
    pub fn edge_detect(&mut self, low: f32, high: f32) -> Result<()> {
        if !low.is_finite() || !high.is_finite() || low < 0.0 || high < low {
            return Err(EditorError::InvalidParameter(format!(
                "edge thresholds must satisfy 0 <= low <= high, got {low}/{high}"
            )));
        }
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        state.apply_edge_detect(low, high);
        self.commit("Edge detect");
        Ok(())
    }

    pub fn reset_adjustments(&mut self) -> Result<()> {
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        state.reset_adjustments();
        self.commit("Reset adjustments");
        Ok(())
    }

    /// Back to the image as loaded. Like a load, this clears the history and
    /// the reset state becomes the new floor entry.
    pub fn reset_all(&mut self) -> Result<()> {
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        state.reset_all();
        self.history.clear();
        self.gesture = None;
        self.commit("Reset");
        Ok(())
    }

    // -- Continuous actions ---------------------------------------------

    /// Open a slider gesture. Ticks delivered until `end_adjustment` update
    /// the displayed image live without flooding the history.
    pub fn begin_adjustment(&mut self) {
        if self.state.is_some() && self.gesture.is_none() {
            self.gesture = Some(Gesture {
                label: String::new(),
                changed: false,
            });
        }
    }

    /// Commit the whole gesture as one history entry. Does nothing when no
    /// tick actually changed a parameter.
    pub fn end_adjustment(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            if gesture.changed {
                self.commit(&gesture.label);
            }
        }
    }

    pub fn set_blur_level(&mut self, level: i64) -> Result<()> {
        if !(0..=i64::from(u32::MAX)).contains(&level) {
            return Err(EditorError::InvalidParameter(format!(
                "blur level must be non-negative, got {level}"
            )));
        }
        self.continuous_tick(format!("Blur {level}"), |state| {
            state.set_blur_level(level as u32)
        })
    }

    pub fn set_brightness(&mut self, delta: i64) -> Result<()> {
        let (lo, hi) = BRIGHTNESS_RANGE;
        if !(i64::from(lo)..=i64::from(hi)).contains(&delta) {
            return Err(EditorError::InvalidParameter(format!(
                "brightness must be in [{lo}, {hi}], got {delta}"
            )));
        }
        self.continuous_tick(format!("Brightness {delta:+}"), |state| {
            state.set_brightness(delta as i32)
        })
    }

    pub fn set_contrast(&mut self, factor: f32) -> Result<()> {
        let (lo, hi) = CONTRAST_RANGE;
        if !factor.is_finite() || !(lo..=hi).contains(&factor) {
            return Err(EditorError::InvalidParameter(format!(
                "contrast must be in [{lo}, {hi}], got {factor}"
            )));
        }
        self.continuous_tick(format!("Contrast {factor:.2}"), |state| {
            state.set_contrast(factor)
        })
    }

    /// Shared slider-tick plumbing: ignored while restoring a snapshot,
    /// guarded on a loaded image, committed immediately when no gesture is
    /// open.
    fn continuous_tick<F>(&mut self, label: String, apply: F) -> Result<()>
    where
        F: FnOnce(&mut EditState),
    {
        if self.mode == SessionMode::Restoring {
            return Ok(());
        }
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        apply(state);
        match self.gesture.as_mut() {
            Some(gesture) => {
                gesture.label = label;
                gesture.changed = true;
            }
            None => self.commit(&label),
        }
        Ok(())
    }

    // -- Undo / redo ------------------------------------------------------

    pub fn undo(&mut self) -> Result<()> {
        if self.state.is_none() {
            return Err(EditorError::NoImage);
        }
        let snapshot = self.history.undo().cloned().ok_or(EditorError::NothingToUndo)?;
        self.restore(snapshot);
        log_info!("undo -> {}", self.history.undo_history().first().unwrap_or(&""));
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        if self.state.is_none() {
            return Err(EditorError::NoImage);
        }
        let snapshot = self.history.redo().cloned().ok_or(EditorError::NothingToRedo)?;
        let label = snapshot.label.clone();
        self.restore(snapshot);
        log_info!("redo -> {}", label);
        Ok(())
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.mode = SessionMode::Restoring;
        if let Some(state) = self.state.as_mut() {
            state.restore(
                snapshot.base,
                snapshot.displayed,
                snapshot.params,
                snapshot.mode,
            );
        }
        self.mode = SessionMode::Interactive;
        self.dirty = true;
    }

    // -- Queries -----------------------------------------------------------

    pub fn has_image(&self) -> bool {
        self.state.is_some()
    }

    /// The image currently shown (and saved). `None` before the first open.
    pub fn displayed(&self) -> Option<&PixelBuffer> {
        self.state.as_ref().map(EditState::displayed)
    }

    pub fn base(&self) -> Option<&PixelBuffer> {
        self.state.as_ref().map(EditState::base)
    }

    pub fn params(&self) -> Option<Adjustments> {
        self.state.as_ref().map(EditState::params)
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Unsaved changes since the last open/save; drives the
    /// exit-with-unsaved-changes prompt at the command surface.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Hand the displayed image to a rendering surface, scaled to fit the
    /// viewport.
    pub fn present_to(&self, viewport: &Viewport, surface: &mut dyn RenderSurface) -> Result<()> {
        let state = self.state.as_ref().ok_or(EditorError::NoImage)?;
        surface.present(&viewport.scaled_preview(state.displayed())?);
        Ok(())
    }

    // -- Internals ---------------------------------------------------------

    /// Push a deep snapshot of the current state as the new stack top.
    fn commit(&mut self, label: &str) {
        let state = match self.state.as_ref() {
            Some(s) => s,
            None => return,
        };
        let (base, displayed, params, mode) = state.capture();
        self.history.push(Snapshot {
            label: label.to_string(),
            base,
            displayed,
            params,
            mode,
        });
        self.dirty = true;
        log_info!("committed: {}", label);
    }
}
