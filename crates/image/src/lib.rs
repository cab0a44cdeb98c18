//! Image intake, resizing and format conversion for imgconv.
//!
//! This crate provides:
//! - Format detection from magic bytes and declared media types
//! - Intake validation (allow-listed types, size ceiling) and decoding
//! - Aspect-locked dimension fields and output size resolution
//! - Single-pass resize and re-encode into PNG, JPEG, WebP, GIF or BMP
//! - A session that owns at most one live converted artifact
//! - Saving artifacts as `converted-image.<ext>`
//! - Parallel batch conversion
//!
//! # Example
//!
//! ```rust,no_run
//! use imgconv_image::{ConverterOptions, ConverterSession, PickedFile, TargetFormat};
//! use std::path::Path;
//!
//! let session = ConverterSession::new(ConverterOptions::default());
//! session.load(PickedFile::from_path("photo.jpg")?)?;
//! session.set_width(Some(500));
//! session.set_format(TargetFormat::Webp);
//! session.convert()?;
//! let saved = session.download(Path::new("."))?;
//! println!("saved {}", saved.display());
//! # Ok::<(), imgconv_image::ImageError>(())
//! ```

#![warn(missing_docs)]

pub mod artifact;
mod detect;
pub mod dimensions;
pub mod download;
mod error;
mod metadata;

#[cfg(feature = "processing")]
mod alpha;

#[cfg(feature = "processing")]
mod convert;

#[cfg(feature = "processing")]
mod intake;

#[cfg(feature = "processing")]
mod session;

#[cfg(feature = "parallel")]
pub mod batch;

pub use artifact::{ArtifactHandle, ArtifactRegistry, ArtifactSummary, ConvertedArtifact};
pub use detect::{
    detect_format, is_accepted_media_type, media_type_for_extension, media_type_for_path,
    ImageFormat, TargetFormat, ACCEPTED_MEDIA_TYPES,
};
pub use dimensions::{resolve_dimensions, DimensionFields, Dimensions};
pub use download::{download_file_name, save_artifact, DOWNLOAD_STEM};
pub use error::{ErrorKind, ImageError, Result};
pub use metadata::{extract_metadata, ImageMetadata};

#[cfg(feature = "processing")]
pub use metadata::probe_metadata;

#[cfg(feature = "processing")]
pub use alpha::flatten_alpha;

#[cfg(feature = "processing")]
pub use convert::{convert_image, draw_surface, encode_surface, ConversionRequest, ConverterOptions, Encoded};

#[cfg(feature = "processing")]
pub use intake::{load_image, validate_file, PickedFile, SourceImage};

#[cfg(feature = "processing")]
pub use session::ConverterSession;
