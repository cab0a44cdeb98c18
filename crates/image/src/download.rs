//! Saving a converted artifact under its download name.

use crate::artifact::{ArtifactRegistry, ConvertedArtifact};
use crate::{ImageError, Result, TargetFormat};
use std::path::{Path, PathBuf};

/// Stem every download is saved under.
pub const DOWNLOAD_STEM: &str = "converted-image";

/// `converted-image.<ext>` for a format.
pub fn download_file_name(format: TargetFormat) -> String {
    format!("{}.{}", DOWNLOAD_STEM, format.extension())
}

/// Write the bytes behind a live artifact into `dir`.
///
/// The bytes are resolved through the registry, so a revoked artifact can no
/// longer be saved. An existing file with the same name is overwritten.
pub fn save_artifact(
    registry: &ArtifactRegistry,
    artifact: Option<&ConvertedArtifact>,
    dir: &Path,
) -> Result<PathBuf> {
    let artifact = artifact.ok_or_else(|| ImageError::download("no converted image"))?;
    let bytes = registry
        .resolve(artifact.handle())
        .ok_or_else(|| ImageError::download(format!("{} has been released", artifact.handle())))?;

    let write_error = |message: String| {
        move |e: std::io::Error| ImageError::Download {
            message,
            source: Some(e),
        }
    };

    std::fs::create_dir_all(dir)
        .map_err(write_error(format!("cannot create {}", dir.display())))?;

    let path = dir.join(artifact.file_name());
    std::fs::write(&path, &bytes).map_err(write_error(format!("cannot write {}", path.display())))?;

    tracing::info!(
        action = "download",
        path = %path.display(),
        format = %artifact.format(),
        size = bytes.len(),
        "Converted image saved"
    );

    Ok(path)
}
