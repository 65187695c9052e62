//! Avatar upload and crop
//!
//! A picked file is embedded as a data URL, cropped to a square with a zoom
//! and pan, and re-encoded as JPEG. The circular mask is applied when the
//! card is drawn, not here.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::{AvatarError, DecodeError};
use crate::image_loader::{encode_data_url, load_source, mime_for_path};

pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.1;
pub const PAN_STEP: f32 = 0.1;
pub const JPEG_QUALITY: u8 = 95;

/// Read an image file into a base64 `data:` URL.
pub fn load_avatar_file(path: &Path) -> Result<String, AvatarError> {
    let mime = mime_for_path(path).ok_or_else(|| AvatarError::UnsupportedFormat(path.to_path_buf()))?;
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encode_data_url(mime, &bytes))
}

/// Square region of the source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropArea {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

impl CropArea {
    /// Square of side `min(width, height) / zoom`. `offset` pans the square
    /// across the free space, -1.0 being one edge and 1.0 the other.
    pub fn centered(width: u32, height: u32, zoom: f32, offset: (f32, f32)) -> Self {
        let zoom = clamp_zoom(zoom);
        let side = ((width.min(height) as f32 / zoom).round() as u32).clamp(1, width.min(height).max(1));
        let place = |extent: u32, offset: f32| {
            let free = extent.saturating_sub(side) as f32;
            let offset = if offset.is_finite() { offset.clamp(-1.0, 1.0) } else { 0.0 };
            ((free / 2.0) * (1.0 + offset)).round() as u32
        };
        Self {
            x: place(width, offset.0).min(width.saturating_sub(side)),
            y: place(height, offset.1).min(height.saturating_sub(side)),
            size: side,
        }
    }
}

fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        ZOOM_MIN
    } else {
        zoom.clamp(ZOOM_MIN, ZOOM_MAX)
    }
}

pub fn crop_avatar(image: &DynamicImage, area: CropArea) -> DynamicImage {
    image.crop_imm(area.x, area.y, area.size, area.size)
}

/// JPEG-encode at the fixed avatar quality and wrap as a data URL.
pub fn encode_avatar(image: &DynamicImage) -> Result<String, AvatarError> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))?;
    Ok(encode_data_url("image/jpeg", &buf))
}

/// An in-progress crop of a picked image.
#[derive(Debug, Clone)]
pub struct CropSession {
    image: DynamicImage,
    zoom: f32,
    offset: (f32, f32),
}

impl CropSession {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            zoom: ZOOM_MIN,
            offset: (0.0, 0.0),
        }
    }

    /// Open a crop for an embedded or local image source.
    pub fn open(source: &str) -> Result<Self, AvatarError> {
        Ok(Self::new(load_source(source)?))
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn zoom_in(&mut self) {
        self.zoom = clamp_zoom(((self.zoom + ZOOM_STEP) * 10.0).round() / 10.0);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = clamp_zoom(((self.zoom - ZOOM_STEP) * 10.0).round() / 10.0);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset = (
            (self.offset.0 + dx).clamp(-1.0, 1.0),
            (self.offset.1 + dy).clamp(-1.0, 1.0),
        );
    }

    pub fn area(&self) -> CropArea {
        let (width, height) = self.dimensions();
        CropArea::centered(width, height, self.zoom, self.offset)
    }

    /// Crop and encode; the result goes into the card's avatar field.
    pub fn finish(&self) -> Result<String, AvatarError> {
        encode_avatar(&crop_avatar(&self.image, self.area()))
    }
}
