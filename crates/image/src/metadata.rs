//! Image metadata extraction.

use crate::{detect_format, ImageFormat};
use serde::{Deserialize, Serialize};

/// Image metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// File size in bytes
    pub size_bytes: usize,
}

impl ImageMetadata {
    /// Calculate aspect ratio (width / height). Zero for an empty height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Check if image is landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Check if image is portrait orientation.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Check if image is square.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// "Landscape", "Portrait" or "Square".
    pub fn orientation(&self) -> &'static str {
        if self.is_landscape() {
            "Landscape"
        } else if self.is_portrait() {
            "Portrait"
        } else {
            "Square"
        }
    }
}

/// Extract metadata from image headers without decoding pixels.
///
/// Handles JPEG, PNG, GIF, WebP and BMP; returns `None` for anything else
/// or when the header is truncated.
pub fn extract_metadata(data: &[u8]) -> Option<ImageMetadata> {
    let format = detect_format(data).ok()?;

    let (width, height) = match format {
        ImageFormat::Jpeg => jpeg_size(data)?,
        ImageFormat::Png => png_size(data)?,
        ImageFormat::Gif => (le_u16(data, 6)?, le_u16(data, 8)?),
        ImageFormat::WebP => webp_size(data)?,
        ImageFormat::Bmp => bmp_size(data)?,
        _ => return None,
    };

    Some(ImageMetadata {
        width,
        height,
        format,
        size_bytes: data.len(),
    })
}

/// Extract metadata, asking the decoder for header dimensions when the
/// fast header parsers do not cover the format.
#[cfg(feature = "processing")]
pub fn probe_metadata(data: &[u8]) -> crate::Result<ImageMetadata> {
    if let Some(meta) = extract_metadata(data) {
        return Ok(meta);
    }

    let format = detect_format(data)?;
    let (width, height) = image::io::Reader::new(std::io::Cursor::new(data))
        .with_guessed_format()
        .map_err(crate::ImageError::Read)?
        .into_dimensions()
        .map_err(|e| crate::ImageError::Decode(e.to_string()))?;

    Ok(ImageMetadata {
        width,
        height,
        format,
        size_bytes: data.len(),
    })
}

fn be_u16(data: &[u8], at: usize) -> Option<u32> {
    Some(u16::from_be_bytes([*data.get(at)?, *data.get(at + 1)?]) as u32)
}

fn le_u16(data: &[u8], at: usize) -> Option<u32> {
    Some(u16::from_le_bytes([*data.get(at)?, *data.get(at + 1)?]) as u32)
}

fn le_u24(data: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes([*data.get(at)?, *data.get(at + 1)?, *data.get(at + 2)?, 0]))
}

fn slice4(data: &[u8], at: usize) -> Option<[u8; 4]> {
    data.get(at..at + 4)?.try_into().ok()
}

/// Walk JPEG segments up to the first start-of-frame.
fn jpeg_size(data: &[u8]) -> Option<(u32, u32)> {
    let mut pos = 2;
    loop {
        // Any number of 0xFF fill bytes may precede a marker.
        while *data.get(pos)? == 0xFF && *data.get(pos + 1)? == 0xFF {
            pos += 1;
        }
        if *data.get(pos)? != 0xFF {
            return None;
        }
        let marker = *data.get(pos + 1)?;
        match marker {
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => {
                // length(2) precision(1) height(2) width(2)
                let height = be_u16(data, pos + 5)?;
                let width = be_u16(data, pos + 7)?;
                return Some((width, height));
            }
            0x01 | 0xD0..=0xD9 => pos += 2,
            _ => pos += 2 + be_u16(data, pos + 2)? as usize,
        }
    }
}

/// Width and height from the IHDR chunk, which must come first.
fn png_size(data: &[u8]) -> Option<(u32, u32)> {
    if data.get(12..16)? != b"IHDR" {
        return None;
    }
    Some((u32::from_be_bytes(slice4(data, 16)?), u32::from_be_bytes(slice4(data, 20)?)))
}

/// Canvas size from the first WebP chunk (VP8, VP8L or VP8X).
fn webp_size(data: &[u8]) -> Option<(u32, u32)> {
    match data.get(12..16)? {
        b"VP8 " => {
            // 3-byte frame tag, 3-byte start code, then 14-bit sizes.
            let width = le_u16(data, 26)? & 0x3FFF;
            let height = le_u16(data, 28)? & 0x3FFF;
            Some((width, height))
        }
        b"VP8L" => {
            let bits = u32::from_le_bytes(slice4(data, 21)?);
            Some(((bits & 0x3FFF) + 1, ((bits >> 14) & 0x3FFF) + 1))
        }
        b"VP8X" => Some((le_u24(data, 24)? + 1, le_u24(data, 27)? + 1)),
        _ => None,
    }
}

/// BITMAPINFOHEADER size; a negative height marks a top-down bitmap.
fn bmp_size(data: &[u8]) -> Option<(u32, u32)> {
    if u32::from_le_bytes(slice4(data, 14)?) < 40 {
        return None;
    }
    let width = i32::from_le_bytes(slice4(data, 18)?);
    let height = i32::from_le_bytes(slice4(data, 22)?);
    Some((width.unsigned_abs(), height.unsigned_abs()))
}
