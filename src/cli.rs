// ============================================================================
// retouch CLI — the user-facing command surface, headless
// ============================================================================
//
// Usage examples:
//   retouch --input photo.png --op rotate=90 --op brightness=20 --output out.png
//   retouch -i photo.jpg --op grayscale --op blur=3        (writes photo_out.jpg)
//   retouch -i scan.bmp --op edges=100,200 -o edges.png
//   retouch -i photo.png --op rotate=90 --op undo -o same-as-input.png
//
// Operations are applied in the order given. `undo` / `redo` walk the same
// history a GUI would, so a command line is a faithful replay of an editing
// session. All processing runs synchronously; exit code 0 means every step
// succeeded.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::error::EditorError;
use crate::log_err;
use crate::ops::edges::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use crate::ops::transform::FlipAxis;
use crate::session::EditorSession;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// retouch headless image editor.
///
/// Apply an ordered sequence of edit operations to an image — no GUI required.
#[derive(Parser, Debug)]
#[command(
    name = "retouch",
    about = "retouch headless image editor",
    long_about = "Apply edit operations to an image file without opening a window.\n\
                  Reads JPEG, PNG and BMP; writes PNG, JPEG and BMP (chosen by the\n\
                  output extension).\n\n\
                  Operations (applied in order):\n  \
                  rotate=90|180|270      clockwise rotation\n  \
                  flip=horizontal|vertical\n  \
                  resize=WxH             exact target dimensions\n  \
                  grayscale              toggle grayscale\n  \
                  blur=N                 blur strength (0 disables)\n  \
                  brightness=N           -100..100\n  \
                  contrast=F             0.5..3.0\n  \
                  edges[=LOW,HIGH]       destructive edge detection\n  \
                  undo | redo            walk the edit history\n  \
                  reset-adjustments | reset\n\n\
                  Example:\n  \
                  retouch --input photo.png --op rotate=90 --op brightness=20 -o out.png"
)]
pub struct CliArgs {
    /// Input image file (jpeg, png or bmp).
    #[arg(short, long, required = true)]
    pub input: PathBuf,

    /// An edit operation; repeat the flag to chain operations in order.
    #[arg(long = "op", value_name = "OP")]
    pub ops: Vec<String>,

    /// Output file path. When omitted, the result is written next to the
    /// input with an `_out` suffix (never overwriting the input).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print per-operation progress and timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// One parsed edit operation.
#[derive(Debug, Clone, PartialEq)]
enum EditOp {
    Rotate(i64),
    Flip(FlipAxis),
    Resize(i64, i64),
    Grayscale,
    Blur(i64),
    Brightness(i64),
    Contrast(f32),
    Edges(f32, f32),
    Undo,
    Redo,
    ResetAdjustments,
    ResetAll,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the whole command line and return an OS exit code.
/// `0` = every step succeeded, `1` = any failure.
pub fn run(args: CliArgs) -> ExitCode {
    // Parse every operation up front: a typo aborts before any work is done.
    let mut ops = Vec::with_capacity(args.ops.len());
    for raw in &args.ops {
        match parse_op(raw) {
            Ok(op) => ops.push(op),
            Err(e) => {
                eprintln!("error: bad operation '{}': {}", raw, e);
                return ExitCode::FAILURE;
            }
        }
    }

    let start = Instant::now();
    let mut session = EditorSession::new();

    if let Err(e) = session.open(&args.input) {
        eprintln!("error: {}", e);
        log_err!("{}", e);
        return ExitCode::FAILURE;
    }
    if args.verbose {
        if let Some(img) = session.displayed() {
            println!(
                "loaded {} ({}x{})",
                args.input.display(),
                img.width(),
                img.height()
            );
        }
    }

    for (idx, op) in ops.iter().enumerate() {
        let step_start = Instant::now();
        if let Err(e) = apply_op(&mut session, op) {
            eprintln!("error: step {} ({:?}): {}", idx + 1, op, e);
            log_err!("step {} failed: {}", idx + 1, e);
            return ExitCode::FAILURE;
        }
        if args.verbose {
            if let Some(img) = session.displayed() {
                println!(
                    "[{}/{}] {:?} -> {}x{} ({:.0}ms)",
                    idx + 1,
                    ops.len(),
                    op,
                    img.width(),
                    img.height(),
                    step_start.elapsed().as_secs_f64() * 1000.0
                );
            }
        }
    }

    let output = match &args.output {
        Some(path) => path.clone(),
        None => derived_output_path(&args.input),
    };
    if let Err(e) = session.save_as(&output) {
        eprintln!("error: {}", e);
        log_err!("{}", e);
        return ExitCode::FAILURE;
    }

    if args.verbose {
        println!(
            "→ {} ({:.0}ms total)",
            output.display(),
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
    ExitCode::SUCCESS
}

fn apply_op(session: &mut EditorSession, op: &EditOp) -> Result<(), EditorError> {
    match *op {
        EditOp::Rotate(degrees) => session.rotate(degrees),
        EditOp::Flip(axis) => session.flip(axis),
        EditOp::Resize(w, h) => session.resize(w, h),
        EditOp::Grayscale => session.toggle_grayscale(),
        EditOp::Blur(level) => session.set_blur_level(level),
        EditOp::Brightness(delta) => session.set_brightness(delta),
        EditOp::Contrast(factor) => session.set_contrast(factor),
        EditOp::Edges(low, high) => session.edge_detect(low, high),
        EditOp::Undo => session.undo(),
        EditOp::Redo => session.redo(),
        EditOp::ResetAdjustments => session.reset_adjustments(),
        EditOp::ResetAll => session.reset_all(),
    }
}

// ============================================================================
// Operation parsing
// ============================================================================

fn parse_op(raw: &str) -> Result<EditOp, String> {
    let (name, value) = match raw.split_once('=') {
        Some((n, v)) => (n.trim(), Some(v.trim())),
        None => (raw.trim(), None),
    };

    match (name, value) {
        ("rotate", Some(v)) => parse_int(v).map(EditOp::Rotate),
        ("flip", Some("horizontal")) | ("flip", Some("h")) => Ok(EditOp::Flip(FlipAxis::Horizontal)),
        ("flip", Some("vertical")) | ("flip", Some("v")) => Ok(EditOp::Flip(FlipAxis::Vertical)),
        ("flip", Some(v)) => Err(format!("unknown flip axis '{}'", v)),
        ("resize", Some(v)) => {
            let (w, h) = v
                .split_once(['x', 'X'])
                .ok_or_else(|| "expected WxH, e.g. resize=800x600".to_string())?;
            Ok(EditOp::Resize(parse_int(w)?, parse_int(h)?))
        }
        ("grayscale", None) => Ok(EditOp::Grayscale),
        ("blur", Some(v)) => parse_int(v).map(EditOp::Blur),
        ("brightness", Some(v)) => parse_int(v).map(EditOp::Brightness),
        ("contrast", Some(v)) => parse_float(v).map(EditOp::Contrast),
        ("edges", None) => Ok(EditOp::Edges(DEFAULT_LOW_THRESHOLD, DEFAULT_HIGH_THRESHOLD)),
        ("edges", Some(v)) => {
            let (low, high) = v
                .split_once(',')
                .ok_or_else(|| "expected LOW,HIGH, e.g. edges=100,200".to_string())?;
            Ok(EditOp::Edges(parse_float(low)?, parse_float(high)?))
        }
        ("undo", None) => Ok(EditOp::Undo),
        ("redo", None) => Ok(EditOp::Redo),
        ("reset-adjustments", None) => Ok(EditOp::ResetAdjustments),
        ("reset", None) => Ok(EditOp::ResetAll),
        (n @ ("rotate" | "blur" | "brightness" | "contrast" | "resize" | "flip"), None) => {
            Err(format!("operation '{}' requires a value", n))
        }
        (n, Some(_)) => Err(format!("operation '{}' takes no value or is unknown", n)),
        (n, None) => Err(format!("unknown operation '{}'", n)),
    }
}

fn parse_int(v: &str) -> Result<i64, String> {
    v.parse::<i64>()
        .map_err(|_| format!("'{}' is not an integer", v))
}

fn parse_float(v: &str) -> Result<f32, String> {
    v.parse::<f32>()
        .map_err(|_| format!("'{}' is not a number", v))
}

/// Output path when `--output` is omitted: same directory and extension as
/// the input, `_out` appended to the stem so the input is never overwritten.
fn derived_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    parent.join(format!("{}_out.{}", stem, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_full_operation_vocabulary() {
        assert_eq!(parse_op("rotate=90").unwrap(), EditOp::Rotate(90));
        assert_eq!(
            parse_op("flip=horizontal").unwrap(),
            EditOp::Flip(FlipAxis::Horizontal)
        );
        assert_eq!(parse_op("resize=800x600").unwrap(), EditOp::Resize(800, 600));
        assert_eq!(parse_op("grayscale").unwrap(), EditOp::Grayscale);
        assert_eq!(parse_op("blur=3").unwrap(), EditOp::Blur(3));
        assert_eq!(parse_op("brightness=-30").unwrap(), EditOp::Brightness(-30));
        assert_eq!(parse_op("contrast=1.5").unwrap(), EditOp::Contrast(1.5));
        assert_eq!(parse_op("edges").unwrap(), EditOp::Edges(100.0, 200.0));
        assert_eq!(parse_op("edges=50,150").unwrap(), EditOp::Edges(50.0, 150.0));
        assert_eq!(parse_op("undo").unwrap(), EditOp::Undo);
        assert_eq!(parse_op("reset").unwrap(), EditOp::ResetAll);
    }

    #[test]
    fn rejects_malformed_operations() {
        assert!(parse_op("rotate=ninety").is_err());
        assert!(parse_op("resize=800").is_err());
        assert!(parse_op("flip=diagonal").is_err());
        assert!(parse_op("sharpen=3").is_err());
        assert!(parse_op("grayscale=on").is_err());
    }

    #[test]
    fn derived_output_never_collides_with_input() {
        let out = derived_output_path(Path::new("shots/photo.png"));
        assert_eq!(out, Path::new("shots/photo_out.png"));
    }
}
