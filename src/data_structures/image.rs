//! CPU-side decoded images.
//!
//! [`RawImage`] is what every decoder produces and what the normalizer
//! rewrites. It is a plain record: the pixel buffer plus enough layout
//! information (pitch, bit depth, mip descriptors) to address it.

/// Layout of one mip level inside [`RawImage::pixel_data`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MipLevel {
    pub pitch: u32,
    pub offset: u64,
    pub data_size: u64,
}

/// A decoded, not yet uploaded image.
///
/// Scanlines are `pitch` bytes apart. `pitch` can be larger than
/// `width * bytes_per_pixel()` when a decoder pads rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub bit_count: u16,
    pub pitch: u32,
    pub pixel_data: Vec<u8>,
    pub mipmaps: Vec<MipLevel>,
}

impl RawImage {
    /// Create an image with a single base mip level covering `pitch * height` bytes.
    pub fn new(width: u32, height: u32, bit_count: u16, pitch: u32, pixel_data: Vec<u8>) -> Self {
        let base = MipLevel {
            pitch,
            offset: 0,
            data_size: u64::from(pitch) * u64::from(height),
        };
        Self {
            width,
            height,
            bit_count,
            pitch,
            pixel_data,
            mipmaps: vec![base],
        }
    }

    /// Create a tightly packed image (`pitch == width * bit_count / 8`).
    pub fn packed(width: u32, height: u32, bit_count: u16, pixel_data: Vec<u8>) -> Self {
        let pitch = width * u32::from(bit_count / 8);
        Self::new(width, height, bit_count, pitch, pixel_data)
    }

    pub fn data_size(&self) -> u64 {
        self.pixel_data.len() as u64
    }

    pub fn bytes_per_pixel(&self) -> usize {
        usize::from(self.bit_count / 8)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixel_data.is_empty()
    }

    /// The pixel bytes of row `y`, without trailing padding.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.pitch as usize;
        let len = self.width as usize * self.bytes_per_pixel();
        self.pixel_data.get(start..start + len)
    }

    /// The bytes described by mip level `level`, or `None` if the level
    /// does not exist or points outside the buffer.
    pub fn mip_bytes(&self, level: usize) -> Option<&[u8]> {
        let mip = self.mipmaps.get(level)?;
        let start = usize::try_from(mip.offset).ok()?;
        let len = usize::try_from(mip.data_size).ok()?;
        self.pixel_data.get(start..start.checked_add(len)?)
    }
}
