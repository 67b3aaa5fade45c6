//! Bit-depth normalization for decoded images.
//!
//! GPUs have no 24-bit or 48-bit texel formats, so those images are widened to
//! 32 and 64 bits before they are published. Every other bit depth is passed
//! through untouched.

use crate::{
    data_structures::image::{MipLevel, RawImage},
    error::TextureError,
};

/// A widening from `src_bytes` to `dst_bytes` per pixel.
#[derive(Clone, Copy, Debug)]
struct Expansion {
    src_bytes: usize,
    dst_bytes: usize,
    bit_count: u16,
}

fn expansion_for(bit_count: u16) -> Option<Expansion> {
    match bit_count {
        24 => Some(Expansion {
            src_bytes: 3,
            dst_bytes: 4,
            bit_count: 32,
        }),
        48 => Some(Expansion {
            src_bytes: 6,
            dst_bytes: 8,
            bit_count: 64,
        }),
        _ => None,
    }
}

/// Whether [`normalize`] would rewrite `image`.
pub fn needs_normalization(image: &RawImage) -> bool {
    expansion_for(image.bit_count).is_some()
}

fn overflow(what: &str) -> TextureError {
    TextureError::InvalidImage(format!("{what} overflows while expanding the bit depth"))
}

// The pitch, offset and size of every level scale by floor(x / 3) * 4 for
// both expansions. The 48-bit case deliberately uses the same ratio.
fn scale_u32(value: u32, what: &str) -> Result<u32, TextureError> {
    (value / 3).checked_mul(4).ok_or_else(|| overflow(what))
}

fn scale_u64(value: u64, what: &str) -> Result<u64, TextureError> {
    (value / 3).checked_mul(4).ok_or_else(|| overflow(what))
}

fn rescale_mip(mip: &MipLevel) -> Result<MipLevel, TextureError> {
    Ok(MipLevel {
        pitch: scale_u32(mip.pitch, "mip pitch")?,
        offset: scale_u64(mip.offset, "mip offset")?,
        data_size: scale_u64(mip.data_size, "mip size")?,
    })
}

/// Widen 24-bit images to 32 bits and 48-bit images to 64 bits.
///
/// Each source pixel is copied verbatim into the front of a wider slot and the
/// added bytes are zeroed, so a 24-bit RGB image ends up with an alpha of 0.
/// The new pitch is `floor(pitch / 3) * 4` and the new buffer holds exactly
/// `new_pitch * height` bytes. Mip descriptors are rescaled with the same
/// formula; their data is assumed to be packed with the base level's pitch
/// convention, and only the base level is repacked.
///
/// Images with any other bit depth are returned unchanged.
///
/// # Errors
///
/// [`TextureError::InvalidImage`] if the image has no pixels, if a row of
/// `width` pixels does not fit in `pitch`, if the buffer is shorter than
/// `pitch * height`, or if the widened layout does not fit the integer types.
pub fn normalize(image: RawImage) -> Result<RawImage, TextureError> {
    let Some(expansion) = expansion_for(image.bit_count) else {
        return Ok(image);
    };

    if image.width == 0 || image.height == 0 {
        return Err(TextureError::InvalidImage(format!(
            "{}x{} image has no pixels to expand",
            image.width, image.height
        )));
    }
    let height = image.height as usize;
    let pitch = image.pitch as usize;
    let row_bytes = (image.width as usize)
        .checked_mul(expansion.src_bytes)
        .ok_or_else(|| overflow("row size"))?;
    if row_bytes > pitch {
        return Err(TextureError::InvalidImage(format!(
            "a row of {} pixels needs {} bytes but the pitch is {}",
            image.width, row_bytes, pitch
        )));
    }
    let src_size = pitch
        .checked_mul(height)
        .ok_or_else(|| overflow("source size"))?;
    if src_size > image.pixel_data.len() {
        return Err(TextureError::InvalidImage(format!(
            "{} rows of pitch {} need {} bytes but the buffer holds {}",
            height,
            pitch,
            src_size,
            image.pixel_data.len()
        )));
    }

    let new_pitch = scale_u32(image.pitch, "pitch")?;
    let data_size = (new_pitch as usize)
        .checked_mul(height)
        .ok_or_else(|| overflow("data size"))?;
    let mipmaps = image
        .mipmaps
        .iter()
        .map(rescale_mip)
        .collect::<Result<Vec<_>, _>>()?;

    let mut data = vec![0u8; data_size];
    let rows = image
        .pixel_data
        .chunks_exact(pitch)
        .zip(data.chunks_exact_mut(new_pitch as usize))
        .take(height);
    for (src_row, dst_row) in rows {
        let pixels = src_row[..row_bytes]
            .chunks_exact(expansion.src_bytes)
            .zip(dst_row.chunks_exact_mut(expansion.dst_bytes));
        for (src, dst) in pixels {
            dst[..expansion.src_bytes].copy_from_slice(src);
        }
    }

    log::debug!(
        "expanded {}x{} image from {} to {} bits (pitch {} -> {})",
        image.width,
        image.height,
        image.bit_count,
        expansion.bit_count,
        image.pitch,
        new_pitch
    );

    Ok(RawImage {
        width: image.width,
        height: image.height,
        bit_count: expansion.bit_count,
        pitch: new_pitch,
        pixel_data: data,
        mipmaps,
    })
}
