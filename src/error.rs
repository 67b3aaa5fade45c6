//! Error types shared by the loading pipeline.

use crate::resources::decoder::ImageFormat;

/// Why a texture has no image.
///
/// A single outcome is published per texture and handed to every waiter,
/// which is why the variants carry rendered messages instead of source errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextureError {
    #[error("texture file not found: {0}")]
    MissingAsset(String),

    #[error("failed to read {name}: {message}")]
    Io { name: String, message: String },

    #[error("no decoder registered for the extension of {0}")]
    UnsupportedExtension(String),

    #[error("{format:?} decoder failed: {message}")]
    Decode { format: ImageFormat, message: String },

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("load task for {0} ended without publishing a result")]
    LoadAborted(String),
}

impl TextureError {
    /// `true` for outcomes where the texture simply has no content,
    /// as opposed to content that exists but could not be turned into an image.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::MissingAsset(_) | Self::UnsupportedExtension(_))
    }
}
