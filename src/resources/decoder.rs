//! Picking and running a decoder for a texture file.
//!
//! The decoder is chosen purely by the file name's extension. Parsing itself
//! is delegated to [`ImageParser`] implementations; the default set wraps the
//! `image` crate and keeps each file's native bit depth so that the
//! normalizer sees exactly what the file contained.

use std::collections::HashMap;

use anyhow::{Context, Result};
use image::DynamicImage;

use crate::{data_structures::image::RawImage, error::TextureError};

/// The texture file formats a [`DecoderSet`] can dispatch to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
    Tga,
    Dds,
    Hdr,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 6] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Bmp,
        ImageFormat::Tga,
        ImageFormat::Dds,
        ImageFormat::Hdr,
    ];

    /// Map an extension including its leading dot. Matching is case-sensitive.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".jpg" | ".jpeg" => Some(Self::Jpeg),
            ".png" => Some(Self::Png),
            ".bmp" => Some(Self::Bmp),
            ".tga" => Some(Self::Tga),
            ".dds" => Some(Self::Dds),
            ".hdr" => Some(Self::Hdr),
            _ => None,
        }
    }

    /// The format selected by everything from the last `.` of `file_name` on.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let dot = file_name.rfind('.')?;
        Self::from_extension(&file_name[dot..])
    }

    fn codec(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tga => image::ImageFormat::Tga,
            Self::Dds => image::ImageFormat::Dds,
            Self::Hdr => image::ImageFormat::Hdr,
        }
    }
}

/// Turns the complete contents of a texture file into a [`RawImage`].
///
/// Parsers must be pure: no filesystem access, no shared mutable state.
pub trait ImageParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<RawImage>;
}

impl<F> ImageParser for F
where
    F: Fn(&[u8]) -> Result<RawImage> + Send + Sync,
{
    fn parse(&self, bytes: &[u8]) -> Result<RawImage> {
        self(bytes)
    }
}

/// Parser backed by the `image` crate's codec for one format.
#[derive(Clone, Copy, Debug)]
pub struct CodecParser {
    format: ImageFormat,
}

impl CodecParser {
    pub fn new(format: ImageFormat) -> Self {
        Self { format }
    }
}

impl ImageParser for CodecParser {
    fn parse(&self, bytes: &[u8]) -> Result<RawImage> {
        let img = image::load_from_memory_with_format(bytes, self.format.codec())
            .with_context(|| format!("could not parse {} bytes as {:?}", bytes.len(), self.format))?;
        Ok(raw_from_dynamic(img))
    }
}

/// Flatten a decoded image into a tightly packed [`RawImage`] without
/// changing its channel layout or bit depth.
pub fn raw_from_dynamic(img: DynamicImage) -> RawImage {
    let (width, height) = (img.width(), img.height());
    let (bit_count, data): (u16, Vec<u8>) = match img {
        DynamicImage::ImageLuma8(buf) => (8, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => (16, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (24, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (32, buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => (16, bytemuck::cast_slice::<u16, u8>(buf.as_raw()).to_vec()),
        DynamicImage::ImageLumaA16(buf) => (32, bytemuck::cast_slice::<u16, u8>(buf.as_raw()).to_vec()),
        DynamicImage::ImageRgb16(buf) => (48, bytemuck::cast_slice::<u16, u8>(buf.as_raw()).to_vec()),
        DynamicImage::ImageRgba16(buf) => (64, bytemuck::cast_slice::<u16, u8>(buf.as_raw()).to_vec()),
        DynamicImage::ImageRgb32F(buf) => (96, bytemuck::cast_slice::<f32, u8>(buf.as_raw()).to_vec()),
        DynamicImage::ImageRgba32F(buf) => (128, bytemuck::cast_slice::<f32, u8>(buf.as_raw()).to_vec()),
        other => {
            log::warn!("unknown pixel layout {:?}, converting to rgba8", other.color());
            (32, other.to_rgba8().into_raw())
        }
    };
    RawImage::packed(width, height, bit_count, data)
}

/// One parser per [`ImageFormat`], selected by file extension.
pub struct DecoderSet {
    parsers: HashMap<ImageFormat, Box<dyn ImageParser>>,
}

impl Default for DecoderSet {
    fn default() -> Self {
        let mut set = Self::empty();
        for format in ImageFormat::ALL {
            set.register(format, CodecParser::new(format));
        }
        set
    }
}

impl DecoderSet {
    /// A set without any parsers. Every decode reports an unsupported extension.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Install `parser` for `format`, replacing any previous one.
    pub fn register(&mut self, format: ImageFormat, parser: impl ImageParser + 'static) {
        self.parsers.insert(format, Box::new(parser));
    }

    pub fn with(mut self, format: ImageFormat, parser: impl ImageParser + 'static) -> Self {
        self.register(format, parser);
        self
    }

    pub fn supports(&self, file_name: &str) -> bool {
        ImageFormat::from_file_name(file_name).is_some_and(|format| self.parsers.contains_key(&format))
    }

    /// Decode `bytes` with the parser matching `file_name`'s extension.
    ///
    /// # Errors
    ///
    /// [`TextureError::UnsupportedExtension`] when no parser matches, or
    /// [`TextureError::Decode`] with the parser's error chain.
    pub fn decode(&self, bytes: &[u8], file_name: &str) -> Result<RawImage, TextureError> {
        let (format, parser) = ImageFormat::from_file_name(file_name)
            .and_then(|format| self.parsers.get(&format).map(|parser| (format, parser)))
            .ok_or_else(|| TextureError::UnsupportedExtension(file_name.to_string()))?;
        log::debug!("decoding {} ({} bytes) as {:?}", file_name, bytes.len(), format);
        parser.parse(bytes).map_err(|e| TextureError::Decode {
            format,
            message: format!("{e:#}"),
        })
    }
}
