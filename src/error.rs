//! Error types for the store, the avatar pipeline and the exporters

use std::path::PathBuf;

use thiserror::Error;

use crate::export::ExportMode;
use crate::model::{CardSlot, Layout};

/// Rejected store mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The slot does not exist in the current layout
    #[error("The {slot} card is not part of the {layout} layout")]
    SlotUnavailable { slot: CardSlot, layout: Layout },

    /// Duplicating a card onto itself
    #[error("Cannot duplicate the {0} card onto itself")]
    SameSlot(CardSlot),
}

/// Failures while reading or decoding an image source
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed data URL")]
    MalformedDataUrl,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Unsupported image source: {0}")]
    UnsupportedSource(String),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Failures while loading or cropping an avatar
#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("Unsupported image format: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Failed to encode avatar: {0}")]
    Encode(#[from] image::ImageError),
}

/// Failures of the capture step of an export
#[derive(Error, Debug)]
pub enum ExportError {
    /// No rendered card is mounted for the requested export
    #[error("No rendered card is mounted for the {0} export")]
    MissingNode(ExportMode),

    /// No font could be loaded for rasterized text
    #[error("No usable font found (set export.font_path in the config)")]
    FontUnavailable,

    /// The drawing surface could not be allocated
    #[error("Canvas context unavailable: {0}")]
    CanvasUnavailable(String),

    /// The rasterizer rejected the card
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// A captured bitmap could not be encoded or decoded
    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    /// The file sink could not write the output
    #[error("Failed to write {filename}: {source}")]
    Sink {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    /// A background capture task panicked or was dropped
    #[error("Export task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
