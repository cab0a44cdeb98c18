//! Image format detection, declared media types and output formats.

use crate::{ImageError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Media types accepted at intake.
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/bmp",
    "image/tiff",
    "image/x-tiff",
    "image/heif",
    "image/heic",
];

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// WebP image
    WebP,
    /// AVIF image
    Avif,
    /// BMP image
    Bmp,
    /// TIFF image
    Tiff,
    /// HEIC/HEIF image
    Heic,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Avif => "image/avif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Heic => "image/heic",
        }
    }
}

/// Formats a converted image can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// PNG
    #[default]
    Png,
    /// JPEG
    Jpeg,
    /// WebP (lossless)
    Webp,
    /// GIF
    Gif,
    /// BMP
    Bmp,
}

impl TargetFormat {
    /// Every output format, in menu order.
    pub const ALL: [TargetFormat; 5] = [
        TargetFormat::Png,
        TargetFormat::Jpeg,
        TargetFormat::Webp,
        TargetFormat::Gif,
        TargetFormat::Bmp,
    ];

    /// Extension used for downloaded files.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Webp => "webp",
            TargetFormat::Gif => "gif",
            TargetFormat::Bmp => "bmp",
        }
    }

    /// Media type of the encoded output.
    pub fn mime_type(&self) -> &'static str {
        self.image_format().mime_type()
    }

    /// Whether the encoder keeps an alpha channel.
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, TargetFormat::Jpeg)
    }

    /// The matching detected format.
    pub fn image_format(&self) -> ImageFormat {
        match self {
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Jpeg => ImageFormat::Jpeg,
            TargetFormat::Webp => ImageFormat::WebP,
            TargetFormat::Gif => ImageFormat::Gif,
            TargetFormat::Bmp => ImageFormat::Bmp,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().trim_start_matches('.').to_ascii_lowercase();
        let name = name.strip_prefix("image/").unwrap_or(&name);
        match name {
            "png" => Ok(TargetFormat::Png),
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            "webp" => Ok(TargetFormat::Webp),
            "gif" => Ok(TargetFormat::Gif),
            "bmp" => Ok(TargetFormat::Bmp),
            _ => Err(ImageError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Whether a declared media type passes the intake allow-list.
///
/// Comparison ignores case, surrounding whitespace and parameters
/// (`image/png; charset=binary`).
pub fn is_accepted_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    ACCEPTED_MEDIA_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(essence))
}

/// Media type a file picker would declare for a file extension.
pub fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    let media_type = match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "jpe" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heif" => "image/heif",
        "heic" => "image/heic",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(media_type)
}

/// Media type declared for a path, from its extension.
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(media_type_for_extension)
}

/// Detect image format from magic bytes.
///
/// # Arguments
/// * `data` - First few bytes of the image file (at least 12 bytes recommended)
///
/// # Returns
/// Detected image format, or error if unknown
///
/// # Example
/// ```
/// use imgconv_image::detect_format;
///
/// // JPEG magic bytes
/// let jpeg_data = [0xFF, 0xD8, 0xFF, 0xE0];
/// assert!(matches!(detect_format(&jpeg_data), Ok(imgconv_image::ImageFormat::Jpeg)));
///
/// // PNG magic bytes
/// let png_data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// assert!(matches!(detect_format(&png_data), Ok(imgconv_image::ImageFormat::Png)));
/// ```
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 4 {
        return Err(ImageError::InvalidData("Not enough data for format detection".into()));
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(ImageFormat::Png);
    }

    // GIF: GIF87a or GIF89a
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Ok(ImageFormat::Gif);
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Ok(ImageFormat::WebP);
    }

    // BMP: BM
    if data.starts_with(b"BM") {
        return Ok(ImageFormat::Bmp);
    }

    // TIFF: II or MM (little/big endian)
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Ok(ImageFormat::Tiff);
    }

    // ISO-BMFF: ....ftyp<brand>
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        match &data[8..12] {
            b"avif" | b"avis" => return Ok(ImageFormat::Avif),
            b"heic" | b"heix" | b"hevc" | b"heim" | b"mif1" | b"msf1" => {
                return Ok(ImageFormat::Heic);
            }
            _ => {}
        }
    }

    Err(ImageError::UnknownFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
        assert_eq!(detect_format(&data).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
        assert_eq!(detect_format(&data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_webp() {
        let data = b"RIFF\x00\x00\x00\x00WEBP";
        assert_eq!(detect_format(data).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_detect_heic_and_avif_brands() {
        assert_eq!(detect_format(b"\x00\x00\x00\x18ftypheic").unwrap(), ImageFormat::Heic);
        assert_eq!(detect_format(b"\x00\x00\x00\x18ftypmif1").unwrap(), ImageFormat::Heic);
        assert_eq!(detect_format(b"\x00\x00\x00\x18ftypavif").unwrap(), ImageFormat::Avif);
    }

    #[test]
    fn test_unknown_format() {
        assert!(matches!(detect_format(&[0, 0, 0, 0]), Err(ImageError::UnknownFormat)));
        assert!(matches!(detect_format(&[]), Err(ImageError::InvalidData(_))));
    }

    #[test]
    fn test_allow_list() {
        for accepted in ACCEPTED_MEDIA_TYPES {
            assert!(is_accepted_media_type(accepted));
        }
        assert!(is_accepted_media_type("IMAGE/PNG"));
        assert!(is_accepted_media_type("image/x-tiff"));
        assert!(is_accepted_media_type("image/png; charset=binary"));
        assert!(!is_accepted_media_type("image/svg+xml"));
        assert!(!is_accepted_media_type("image/avif"));
        assert!(!is_accepted_media_type("text/plain"));
        assert!(!is_accepted_media_type(""));
    }

    #[test]
    fn test_media_type_for_path() {
        assert_eq!(media_type_for_path(Path::new("a/photo.JPG")), Some("image/jpeg"));
        assert_eq!(media_type_for_path(Path::new("scan.tif")), Some("image/tiff"));
        assert_eq!(media_type_for_path(Path::new("IMG_0001.HEIC")), Some("image/heic"));
        assert_eq!(media_type_for_path(Path::new("notes")), None);
        assert_eq!(media_type_for_path(Path::new("archive.zip")), None);
    }

    #[test]
    fn test_target_format_parsing() {
        assert_eq!("png".parse::<TargetFormat>().unwrap(), TargetFormat::Png);
        assert_eq!("JPG".parse::<TargetFormat>().unwrap(), TargetFormat::Jpeg);
        assert_eq!(".webp".parse::<TargetFormat>().unwrap(), TargetFormat::Webp);
        assert_eq!("image/bmp".parse::<TargetFormat>().unwrap(), TargetFormat::Bmp);
        assert!(matches!(
            "tiff".parse::<TargetFormat>(),
            Err(ImageError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_target_format_extensions_and_mime() {
        let exts: Vec<_> = TargetFormat::ALL.iter().map(|f| f.extension()).collect();
        assert_eq!(exts, ["png", "jpeg", "webp", "gif", "bmp"]);
        assert_eq!(TargetFormat::Webp.mime_type(), "image/webp");
        assert!(!TargetFormat::Jpeg.supports_alpha());
        assert!(TargetFormat::Png.supports_alpha());
    }
}
