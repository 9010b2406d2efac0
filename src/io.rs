// ============================================================================
// IMAGE I/O — decode/encode collaborator over the `image` crate
// ============================================================================
//
// Read: JPEG, PNG, BMP. Write: PNG, JPEG, BMP, selected by the target
// extension. Everything else surfaces as a Decode/Encode error and leaves
// session state untouched.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

use crate::buffer::{Channels, PixelBuffer};
use crate::error::{EditorError, Result};

const READ_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Decode a file into a pixel buffer. Single-channel files stay grayscale;
/// everything else lands as 3-channel RGB.
pub fn decode(path: &Path) -> Result<PixelBuffer> {
    let ext = extension_of(path);
    if !READ_EXTENSIONS.contains(&ext.as_str()) {
        return Err(EditorError::Decode {
            path: path.to_path_buf(),
            reason: format!("unsupported extension '.{ext}'"),
        });
    }

    let img = image::open(path).map_err(|e| EditorError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let buf = match img {
        DynamicImage::ImageLuma8(gray) => {
            let (w, h) = gray.dimensions();
            PixelBuffer::from_raw(w, h, Channels::Gray, gray.into_raw())
        }
        other => {
            let rgb = other.into_rgb8();
            let (w, h) = rgb.dimensions();
            PixelBuffer::from_raw(w, h, Channels::Rgb, rgb.into_raw())
        }
    };

    buf.ok_or_else(|| EditorError::Decode {
        path: path.to_path_buf(),
        reason: "decoder produced a malformed pixel buffer".into(),
    })
}

/// Encode a pixel buffer to the format implied by the target extension.
pub fn encode(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    let format = match extension_of(path).as_str() {
        "png" => ImageFormat::Png,
        "jpg" | "jpeg" => ImageFormat::Jpeg,
        "bmp" => ImageFormat::Bmp,
        other => {
            return Err(EditorError::Encode {
                path: path.to_path_buf(),
                reason: format!("unsupported extension '.{other}'"),
            });
        }
    };
    if buffer.is_empty() {
        return Err(EditorError::Encode {
            path: path.to_path_buf(),
            reason: "nothing to save".into(),
        });
    }

    let dynamic = to_dynamic(buffer).ok_or_else(|| EditorError::Encode {
        path: path.to_path_buf(),
        reason: "malformed pixel buffer".into(),
    })?;

    dynamic
        .save_with_format(path, format)
        .map_err(|e| EditorError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn to_dynamic(buffer: &PixelBuffer) -> Option<DynamicImage> {
    let w = buffer.width();
    let h = buffer.height();
    match buffer.channels() {
        Channels::Gray => {
            GrayImage::from_raw(w, h, buffer.data().to_vec()).map(DynamicImage::ImageLuma8)
        }
        Channels::Rgb => {
            RgbImage::from_raw(w, h, buffer.data().to_vec()).map(DynamicImage::ImageRgb8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn unsupported_read_extension_is_a_decode_error() {
        let err = decode(&PathBuf::from("photo.tiff")).unwrap_err();
        assert!(matches!(err, EditorError::Decode { .. }));
    }

    #[test]
    fn unsupported_write_extension_is_an_encode_error() {
        let buf = PixelBuffer::new(2, 2, Channels::Rgb);
        let err = encode(&buf, &PathBuf::from("out.webp")).unwrap_err();
        assert!(matches!(err, EditorError::Encode { .. }));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = decode(&PathBuf::from("definitely-not-here.png")).unwrap_err();
        assert!(matches!(err, EditorError::Decode { .. }));
    }
}
