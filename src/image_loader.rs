//! Image loading utilities
//!
//! Decodes avatar sources: embedded `data:` URLs, `file://` URLs and plain
//! local paths.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};

use crate::error::DecodeError;

/// Load an image from a file path
pub fn load_image(path: &Path) -> Result<DynamicImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_image_from_bytes(&bytes)
}

/// Load an image from bytes
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Decode any avatar source the card may reference.
pub fn load_source(source: &str) -> Result<DynamicImage, DecodeError> {
    if source.starts_with("data:") {
        let (_, bytes) = decode_data_url(source)?;
        return load_image_from_bytes(&bytes);
    }
    if let Some(path) = source.strip_prefix("file://") {
        return load_image(Path::new(path));
    }
    if source.starts_with("http://") || source.starts_with("https://") {
        return Err(DecodeError::UnsupportedSource(source.to_string()));
    }
    load_image(&PathBuf::from(source))
}

/// Split a base64 `data:` URL into its mime type and payload.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), DecodeError> {
    let rest = url.strip_prefix("data:").ok_or(DecodeError::MalformedDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(DecodeError::MalformedDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(DecodeError::MalformedDataUrl)?;
    let bytes = STANDARD.decode(payload.trim())?;
    Ok((mime.to_string(), bytes))
}

/// Build a base64 `data:` URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Get supported image format extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["png", "jpg", "jpeg", "gif", "webp"]
}

/// Check if a file extension is a supported image format
pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            supported_extensions().iter().any(|&e| e == ext_lower)
        })
        .unwrap_or(false)
}

/// Mime type for a supported image path
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    if !is_supported_format(path) {
        return None;
    }
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_is_supported_format() {
        assert!(is_supported_format(&PathBuf::from("me.png")));
        assert!(is_supported_format(&PathBuf::from("me.JPEG")));
        assert!(!is_supported_format(&PathBuf::from("notes.txt")));
        assert!(!is_supported_format(&PathBuf::from("avatar")));
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a.jpg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.png")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("a.bmp")), None);
    }

    #[test]
    fn test_data_url_roundtrip_decodes() {
        let url = encode_data_url("image/png", &png_bytes(3, 2));
        assert!(url.starts_with("data:image/png;base64,"));
        let img = load_source(&url).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
    }

    #[test]
    fn test_malformed_data_url() {
        assert!(matches!(
            decode_data_url("data:image/png,plain"),
            Err(DecodeError::MalformedDataUrl)
        ));
    }

    #[test]
    fn test_remote_sources_rejected() {
        assert!(matches!(
            load_source("https://example.com/a.png"),
            Err(DecodeError::UnsupportedSource(_))
        ));
    }
}
