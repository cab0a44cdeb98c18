//! The conversion pipeline: resolve size, draw onto a surface, encode.

use crate::alpha::flatten_alpha;
use crate::dimensions::{resolve_dimensions, DimensionFields, Dimensions};
use crate::{ImageError, Result, TargetFormat};
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use imgconv_core::config::{ConversionConfig, DEFAULT_MAX_DIMENSION, DEFAULT_MAX_UPLOAD_BYTES};
use std::io::Cursor;

/// Encoder and limit settings shared by every conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Color transparent pixels are composited onto for formats without alpha
    pub background: [u8; 3],
    /// Largest accepted upload in bytes
    pub max_upload_bytes: u64,
    /// Largest accepted output edge in pixels
    pub max_dimension: u32,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 92,
            background: [255, 255, 255],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl From<&ConversionConfig> for ConverterOptions {
    fn from(config: &ConversionConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
            background: config.background,
            max_upload_bytes: config.max_upload_bytes,
            max_dimension: config.max_dimension,
        }
    }
}

/// What to produce from the loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Output format
    pub format: TargetFormat,
    /// Requested width, if any
    pub width: Option<i64>,
    /// Requested height, if any
    pub height: Option<i64>,
    /// Whether the request came from aspect-locked fields
    pub maintain_aspect: bool,
}

impl ConversionRequest {
    /// Natural-size conversion to `format`.
    pub fn new(format: TargetFormat) -> Self {
        Self {
            format,
            width: None,
            height: None,
            maintain_aspect: true,
        }
    }

    /// Snapshot the current dimension fields.
    pub fn from_fields(format: TargetFormat, fields: &DimensionFields) -> Self {
        Self {
            format,
            width: fields.width(),
            height: fields.height(),
            maintain_aspect: fields.maintain_aspect(),
        }
    }

    /// Request a width.
    pub fn with_width(mut self, width: i64) -> Self {
        self.width = Some(width);
        self
    }

    /// Request a height.
    pub fn with_height(mut self, height: i64) -> Self {
        self.height = Some(height);
        self
    }
}

/// Encoded output of one conversion.
#[derive(Debug, Clone)]
pub struct Encoded {
    /// Encoded bytes
    pub bytes: Vec<u8>,
    /// Format the bytes are in
    pub format: TargetFormat,
    /// Size the image was drawn at
    pub dimensions: Dimensions,
}

/// Convert a decoded image.
///
/// # Arguments
/// * `source` - Decoded source bitmap
/// * `request` - Output format and requested size
/// * `options` - Encoder settings and limits
///
/// # Returns
/// The encoded image and the size it was drawn at
pub fn convert_image(
    source: &DynamicImage,
    request: &ConversionRequest,
    options: &ConverterOptions,
) -> Result<Encoded> {
    let natural = Dimensions::new(source.width(), source.height());
    let target = resolve_dimensions(natural, request.width, request.height, options.max_dimension)?;

    tracing::debug!(
        natural = %natural,
        target = %target,
        format = %request.format,
        maintain_aspect = request.maintain_aspect,
        "Drawing conversion surface"
    );

    let surface = draw_surface(source, target);
    let bytes = encode_surface(surface, request.format, options)?;

    Ok(Encoded {
        bytes,
        format: request.format,
        dimensions: target,
    })
}

/// Draw `source` scaled into a fresh RGBA surface of `target` size in one pass.
pub fn draw_surface(source: &DynamicImage, target: Dimensions) -> RgbaImage {
    if source.width() == target.width && source.height() == target.height {
        source.to_rgba8()
    } else {
        source
            .resize_exact(target.width, target.height, FilterType::Triangle)
            .into_rgba8()
    }
}

/// Encode a surface into the target format's bytes.
pub fn encode_surface(
    surface: RgbaImage,
    format: TargetFormat,
    options: &ConverterOptions,
) -> Result<Vec<u8>> {
    let img = if format.supports_alpha() {
        DynamicImage::ImageRgba8(surface)
    } else {
        DynamicImage::ImageRgb8(flatten_alpha(&surface, options.background))
    };

    let output_format = match format {
        TargetFormat::Png => ImageOutputFormat::Png,
        TargetFormat::Jpeg => ImageOutputFormat::Jpeg(options.jpeg_quality),
        TargetFormat::Webp => ImageOutputFormat::WebP,
        TargetFormat::Gif => ImageOutputFormat::Gif,
        TargetFormat::Bmp => ImageOutputFormat::Bmp,
    };

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, output_format)
        .map_err(|e| ImageError::Encode {
            format,
            reason: e.to_string(),
        })?;

    let bytes = buffer.into_inner();
    if bytes.is_empty() {
        return Err(ImageError::Encode {
            format,
            reason: "encoder returned no data".into(),
        });
    }
    Ok(bytes)
}
