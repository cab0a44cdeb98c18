//! Error types for the image crate.

use crate::TargetFormat;
use imgconv_core::{Error as AppError, ErrorCode};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during intake, conversion and download.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Unknown image format
    #[error("Unknown image format")]
    UnknownFormat,

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),

    /// Output format name not recognised
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Declared media type is not on the allow-list
    #[error("Invalid file type: {}", display_media_type(.media_type))]
    InvalidType {
        /// Declared media type of the rejected file
        media_type: String,
    },

    /// File exceeds the upload ceiling
    #[error("File is too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Size of the rejected file
        size: u64,
        /// Configured ceiling
        limit: u64,
    },

    /// File could not be read
    #[error("Error reading the file: {0}")]
    Read(#[source] std::io::Error),

    /// Bytes could not be decoded into a bitmap
    #[error("Error loading image, the file may be corrupted: {0}")]
    Decode(String),

    /// Resolved output dimensions are unusable
    #[error("Invalid dimensions: {0}")]
    Dimension(String),

    /// Encoder failed or produced no data
    #[error("Failed to encode image as {format}: {reason}")]
    Encode {
        /// Requested output format
        format: TargetFormat,
        /// Encoder failure description
        reason: String,
    },

    /// Converted image could not be saved
    #[error("Failed to save converted image: {message}")]
    Download {
        /// What went wrong
        message: String,
        /// Underlying write failure, if any
        #[source]
        source: Option<std::io::Error>,
    },

    /// Conversion requested before an image was loaded
    #[error("No image loaded")]
    NoSource,

    /// A conversion is already running in this session
    #[error("A conversion is already in progress")]
    Busy,

    /// The source was reset or replaced while a conversion was running
    #[error("The source image changed while converting; the result was discarded")]
    SourceChanged,
}

fn display_media_type(media_type: &str) -> &str {
    if media_type.is_empty() { "unknown" } else { media_type }
}

/// Coarse classification of [`ImageError`] for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad type, size or option value
    Validation,
    /// File unreadable
    Read,
    /// Corrupt or undecodable image
    Decode,
    /// Non-positive or oversized output dimensions
    Dimension,
    /// Encoder returned no data
    Encode,
    /// Save triggered without a usable artifact
    Download,
    /// Operation not allowed in the current session state
    State,
}

impl ImageError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImageError::UnknownFormat
            | ImageError::UnsupportedFormat(_)
            | ImageError::InvalidType { .. }
            | ImageError::TooLarge { .. } => ErrorKind::Validation,
            ImageError::Read(_) => ErrorKind::Read,
            ImageError::InvalidData(_) | ImageError::Decode(_) => ErrorKind::Decode,
            ImageError::Dimension(_) => ErrorKind::Dimension,
            ImageError::Encode { .. } => ErrorKind::Encode,
            ImageError::Download { .. } => ErrorKind::Download,
            ImageError::NoSource | ImageError::Busy | ImageError::SourceChanged => ErrorKind::State,
        }
    }

    pub(crate) fn download(message: impl Into<String>) -> Self {
        ImageError::Download {
            message: message.into(),
            source: None,
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            ImageError::UnknownFormat | ImageError::UnsupportedFormat(_) => ErrorCode::InvalidInput,
            ImageError::InvalidType { .. } => ErrorCode::InvalidFileType,
            ImageError::TooLarge { .. } => ErrorCode::FileTooLarge,
            ImageError::Read(_) => ErrorCode::ReadFailed,
            ImageError::InvalidData(_) | ImageError::Decode(_) => ErrorCode::DecodeFailed,
            ImageError::Dimension(_) => ErrorCode::InvalidDimensions,
            ImageError::Encode { .. } => ErrorCode::EncodeFailed,
            ImageError::Download { source: Some(_), .. } => ErrorCode::WriteFailed,
            ImageError::Download { source: None, .. } => ErrorCode::NoConvertedImage,
            ImageError::NoSource => ErrorCode::NoImageLoaded,
            ImageError::Busy => ErrorCode::ConversionInProgress,
            ImageError::SourceChanged => ErrorCode::SourceChanged,
        }
    }

    fn suggestion(&self) -> &'static str {
        match self {
            ImageError::UnknownFormat | ImageError::UnsupportedFormat(_) => {
                "Choose one of: png, jpeg, webp, gif, bmp"
            }
            ImageError::InvalidType { .. } => {
                "Upload a JPEG, PNG, WEBP, GIF, BMP, TIFF or HEIF/HEIC image, or pass --type"
            }
            ImageError::TooLarge { .. } => "Use a smaller file or raise conversion.max_upload_bytes",
            ImageError::Read(_) => "Check that the file exists and you have read permissions",
            ImageError::InvalidData(_) | ImageError::Decode(_) => {
                "The file may be corrupted or in a format this build cannot decode"
            }
            ImageError::Dimension(_) => "Width and height must be positive numbers",
            ImageError::Encode { .. } => "Try a different output format",
            ImageError::Download { source: Some(_), .. } => {
                "Check that the output directory is writable"
            }
            ImageError::Download { source: None, .. } => "Please convert an image first",
            ImageError::NoSource => "Please upload an image first",
            ImageError::Busy => "Wait for the current conversion to finish",
            ImageError::SourceChanged => "Convert again with the current image",
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        let code = err.code();
        let suggestion = err.suggestion();
        AppError::new(code, err.to_string())
            .with_suggestion(suggestion)
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ImageError::InvalidType { media_type: "text/plain".into() }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(ImageError::TooLarge { size: 2, limit: 1 }.kind(), ErrorKind::Validation);
        assert_eq!(ImageError::Decode("bad".into()).kind(), ErrorKind::Decode);
        assert_eq!(ImageError::Dimension("0x0".into()).kind(), ErrorKind::Dimension);
        assert_eq!(ImageError::download("none").kind(), ErrorKind::Download);
        assert_eq!(ImageError::Busy.kind(), ErrorKind::State);
    }

    #[test]
    fn test_empty_media_type_displays_as_unknown() {
        let err = ImageError::InvalidType { media_type: String::new() };
        assert_eq!(err.to_string(), "Invalid file type: unknown");
    }

    #[test]
    fn test_conversion_to_app_error() {
        let app: AppError = ImageError::TooLarge { size: 200, limit: 100 }.into();
        assert_eq!(app.code, ErrorCode::FileTooLarge);
        assert_eq!(app.exit_code(), imgconv_core::error::exit_codes::VALIDATION_ERROR);
        assert!(app.suggestion.is_some());
        assert!(app.source.is_some());
    }

    #[test]
    fn test_download_codes_depend_on_cause() {
        let missing: AppError = ImageError::download("no artifact").into();
        assert_eq!(missing.code, ErrorCode::NoConvertedImage);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let failed: AppError = ImageError::Download { message: "write".into(), source: Some(io) }.into();
        assert_eq!(failed.code, ErrorCode::WriteFailed);
    }
}
