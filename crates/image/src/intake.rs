//! Image intake: validate a picked file, read it, decode it.

use crate::detect::{detect_format, is_accepted_media_type, media_type_for_path, ImageFormat};
use crate::dimensions::Dimensions;
use crate::{ImageError, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum Content {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file handed over by a picker, a drop, or the command line.
///
/// Carries what a browser `File` carries before it is read: a name, a
/// declared media type, and a size.
#[derive(Debug, Clone)]
pub struct PickedFile {
    name: String,
    media_type: String,
    size: u64,
    content: Content,
}

impl PickedFile {
    /// Pick a file on disk. The declared media type comes from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(ImageError::Read)?;
        if !meta.is_file() {
            return Err(ImageError::Read(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            )));
        }

        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            media_type: media_type_for_path(path).unwrap_or_default().to_string(),
            size: meta.len(),
            content: Content::Path(path.to_path_buf()),
        })
    }

    /// An in-memory file, e.g. from a drop event.
    pub fn from_bytes(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            content: Content::Memory(bytes),
        }
    }

    /// Override the declared media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// File name without directories.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type; empty when unknown.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Size in bytes as reported before reading.
    pub fn size(&self) -> u64 {
        self.size
    }

    fn into_bytes(self) -> Result<Vec<u8>> {
        match self.content {
            Content::Path(path) => std::fs::read(path).map_err(ImageError::Read),
            Content::Memory(bytes) => Ok(bytes),
        }
    }
}

/// A decoded, immutable source image.
#[derive(Debug, Clone)]
pub struct SourceImage {
    name: String,
    media_type: String,
    size_bytes: u64,
    detected_format: Option<ImageFormat>,
    natural: Dimensions,
    bitmap: DynamicImage,
}

impl SourceImage {
    /// Original file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Media type declared at intake.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// File size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Format recognised from magic bytes, if any.
    pub fn detected_format(&self) -> Option<ImageFormat> {
        self.detected_format
    }

    /// Natural pixel size.
    pub fn natural(&self) -> Dimensions {
        self.natural
    }

    /// Decoded pixels.
    pub fn bitmap(&self) -> &DynamicImage {
        &self.bitmap
    }
}

/// Check type and size before any bytes are read.
pub fn validate_file(file: &PickedFile, max_bytes: u64) -> Result<()> {
    if !is_accepted_media_type(file.media_type()) {
        return Err(ImageError::InvalidType {
            media_type: file.media_type().to_string(),
        });
    }

    if file.size() > max_bytes {
        return Err(ImageError::TooLarge {
            size: file.size(),
            limit: max_bytes,
        });
    }

    Ok(())
}

/// Validate, read and decode a picked file.
pub fn load_image(file: PickedFile, max_bytes: u64) -> Result<SourceImage> {
    validate_file(&file, max_bytes)?;

    let name = file.name().to_string();
    let media_type = file.media_type().to_string();
    let bytes = file.into_bytes()?;

    // The declared size may be stale if the file changed after it was picked.
    let size_bytes = bytes.len() as u64;
    if size_bytes > max_bytes {
        return Err(ImageError::TooLarge {
            size: size_bytes,
            limit: max_bytes,
        });
    }

    let detected_format = detect_format(&bytes).ok();
    let bitmap = image::load_from_memory(&bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    let natural = Dimensions::new(bitmap.width(), bitmap.height());
    if natural.is_empty() {
        return Err(ImageError::Decode("image has no pixels".into()));
    }

    tracing::debug!(
        file_name = %name,
        file_type = %media_type,
        file_size = size_bytes,
        detected = ?detected_format,
        natural = %natural,
        "Image decoded"
    );

    Ok(SourceImage {
        name,
        media_type,
        size_bytes,
        detected_format,
        natural,
        bitmap,
    })
}
