// ============================================================================
// ERROR TAXONOMY
// ============================================================================
//
// Every user-visible failure maps onto one of these variants; the command
// surface renders them as blocking notices. A failed action never leaves a
// partial mutation behind and never pushes a history entry.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    /// Unreadable/corrupt file or unsupported input extension.
    #[error("could not open '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    /// Write failure or unsupported output extension.
    #[error("could not save '{path}': {reason}")]
    Encode { path: PathBuf, reason: String },

    /// Out-of-range or malformed parameter; the action is aborted whole.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An edit action was requested before any image was loaded.
    #[error("no image loaded")]
    NoImage,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    /// Save requested before the session has a destination path.
    #[error("no file path set; use save-as")]
    NoSavePath,
}

pub type Result<T> = std::result::Result<T, EditorError>;
