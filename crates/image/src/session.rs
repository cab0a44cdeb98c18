//! The converter session: one loaded image, its dimension fields, and at most
//! one live converted artifact.
//!
//! All operations take `&self`; the session can be shared between threads.
//! Conversions are single-flight: while one runs, a second call fails with
//! [`ImageError::Busy`] instead of queueing. Failures are logged with
//! their action and file context and never disturb the previously loaded
//! state.

use crate::artifact::{ArtifactRegistry, ConvertedArtifact};
use crate::convert::{convert_image, ConversionRequest, ConverterOptions, Encoded};
use crate::dimensions::{DimensionFields, Dimensions};
use crate::download::save_artifact;
use crate::intake::{load_image, PickedFile, SourceImage};
use crate::{ImageError, Result, TargetFormat};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct SessionState {
    source: Option<Arc<SourceImage>>,
    // Bumped whenever the source is replaced or cleared.
    generation: u64,
    fields: DimensionFields,
    format: TargetFormat,
    artifact: Option<ConvertedArtifact>,
}

/// Holds the busy flag for the lifetime of one conversion.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// Everything a conversion needs, captured under the lock.
struct Snapshot {
    source: Arc<SourceImage>,
    request: ConversionRequest,
    generation: u64,
}

/// Interactive conversion session.
#[derive(Debug)]
pub struct ConverterSession {
    options: ConverterOptions,
    registry: ArtifactRegistry,
    state: Mutex<SessionState>,
    busy: AtomicBool,
}

impl ConverterSession {
    /// New session with its own artifact registry.
    pub fn new(options: ConverterOptions) -> Self {
        Self::with_registry(options, ArtifactRegistry::new())
    }

    /// New session publishing artifacts into `registry`.
    pub fn with_registry(options: ConverterOptions, registry: ArtifactRegistry) -> Self {
        Self {
            options,
            registry,
            state: Mutex::new(SessionState {
                source: None,
                generation: 0,
                fields: DimensionFields::default(),
                format: TargetFormat::default(),
                artifact: None,
            }),
            busy: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Options this session converts with.
    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Registry artifacts are published in.
    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    /// Validate, read and decode `file`, making it the current source.
    ///
    /// On success the width/height fields take the natural size and any
    /// artifact of the previous source is released. On failure nothing
    /// changes.
    pub fn load(&self, file: PickedFile) -> Result<Dimensions> {
        let file_name = file.name().to_string();
        let file_type = file.media_type().to_string();
        let file_size = file.size();

        let source = load_image(file, self.options.max_upload_bytes).inspect_err(|e| {
            tracing::warn!(
                action = "load",
                file_name = %file_name,
                file_type = %file_type,
                file_size,
                kind = ?e.kind(),
                error = %e,
                "Image intake failed"
            );
        })?;

        let natural = source.natural();
        let mut state = self.state();
        state.source = Some(Arc::new(source));
        state.generation += 1;
        state.fields.populate(natural);
        if let Some(previous) = state.artifact.take() {
            self.registry.revoke(previous.handle());
        }

        tracing::info!(
            action = "load",
            file_name = %file_name,
            file_type = %file_type,
            file_size,
            width = natural.width,
            height = natural.height,
            "Image loaded"
        );
        Ok(natural)
    }

    /// Currently loaded source.
    pub fn source(&self) -> Option<Arc<SourceImage>> {
        self.state().source.clone()
    }

    /// Whether a source is loaded; conversion is only possible when it is.
    pub fn has_source(&self) -> bool {
        self.state().source.is_some()
    }

    /// Current dimension fields.
    pub fn fields(&self) -> DimensionFields {
        self.state().fields
    }

    /// Edit the width field.
    pub fn set_width(&self, width: Option<i64>) {
        self.state().fields.set_width(width);
    }

    /// Edit the height field.
    pub fn set_height(&self, height: Option<i64>) {
        self.state().fields.set_height(height);
    }

    /// Toggle aspect locking.
    pub fn set_maintain_aspect(&self, on: bool) {
        self.state().fields.set_maintain_aspect(on);
    }

    /// Selected output format.
    pub fn format(&self) -> TargetFormat {
        self.state().format
    }

    /// Select the output format for the next conversion.
    pub fn set_format(&self, format: TargetFormat) {
        self.state().format = format;
    }

    /// Whether a conversion is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// The live artifact, if any.
    pub fn artifact(&self) -> Option<ConvertedArtifact> {
        self.state().artifact.clone()
    }

    /// Convert the current source with the current fields and format.
    ///
    /// The new artifact replaces (and revokes) the previous one.
    pub fn convert(&self) -> Result<ConvertedArtifact> {
        let _busy = BusyGuard::acquire(&self.busy).ok_or_else(|| {
            tracing::warn!(action = "convert", "Conversion already in progress");
            ImageError::Busy
        })?;

        let snapshot = self.snapshot()?;
        let encoded = convert_image(snapshot.source.bitmap(), &snapshot.request, &self.options)
            .inspect_err(|e| self.log_failure("convert", &snapshot.source, e))?;
        let artifact = self.install(&snapshot, encoded)?;

        tracing::info!(
            action = "convert",
            file_name = %snapshot.source.name(),
            format = %artifact.format(),
            width = artifact.dimensions().width,
            height = artifact.dimensions().height,
            size = artifact.size_bytes(),
            handle = %artifact.handle(),
            "Image converted"
        );
        Ok(artifact)
    }

    fn snapshot(&self) -> Result<Snapshot> {
        let state = self.state();
        let source = state.source.clone().ok_or_else(|| {
            tracing::warn!(action = "convert", "Conversion requested with no image loaded");
            ImageError::NoSource
        })?;
        Ok(Snapshot {
            source,
            request: ConversionRequest::from_fields(state.format, &state.fields),
            generation: state.generation,
        })
    }

    fn install(&self, snapshot: &Snapshot, encoded: Encoded) -> Result<ConvertedArtifact> {
        let artifact =
            ConvertedArtifact::register(&self.registry, encoded.bytes, encoded.format, encoded.dimensions);

        let mut state = self.state();
        if state.generation != snapshot.generation {
            self.registry.revoke(artifact.handle());
            let err = ImageError::SourceChanged;
            self.log_failure("convert", &snapshot.source, &err);
            return Err(err);
        }

        if let Some(previous) = state.artifact.replace(artifact.clone()) {
            self.registry.revoke(previous.handle());
        }
        Ok(artifact)
    }

    /// Clear the source and release the artifact.
    ///
    /// The fields go back to the last recorded natural size. Safe to call
    /// with nothing loaded.
    pub fn reset(&self) {
        let mut state = self.state();
        if state.source.take().is_some() {
            state.generation += 1;
        }
        if let Some(artifact) = state.artifact.take() {
            self.registry.revoke(artifact.handle());
        }
        state.fields.restore();
        tracing::debug!(action = "reset", "Session reset");
    }

    /// Save the live artifact as `converted-image.<ext>` in `dir`.
    pub fn download(&self, dir: &Path) -> Result<PathBuf> {
        let artifact = self.artifact();
        save_artifact(&self.registry, artifact.as_ref(), dir).inspect_err(|e| {
            tracing::warn!(action = "download", dir = %dir.display(), error = %e, "Download failed");
        })
    }

    fn log_failure(&self, action: &str, source: &SourceImage, err: &ImageError) {
        tracing::error!(
            action,
            file_name = %source.name(),
            file_type = %source.media_type(),
            file_size = source.size_bytes(),
            kind = ?err.kind(),
            error = %err,
            "Image operation failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{detect_format, ImageFormat};
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn jpeg_file(width: u32, height: u32) -> PickedFile {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 40])));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageOutputFormat::Jpeg(85)).unwrap();
        PickedFile::from_bytes("photo.jpg", "image/jpeg", buffer.into_inner())
    }

    fn session() -> ConverterSession {
        ConverterSession::new(ConverterOptions::default())
    }

    #[test]
    fn test_wide_panorama_converts_at_natural_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(20_000, 4, Rgb([10, 120, 200])));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageOutputFormat::Png).unwrap();
        let session = session();

        let natural = session
            .load(PickedFile::from_bytes("pano.png", "image/png", buffer.into_inner()))
            .unwrap();
        assert_eq!(natural, Dimensions::new(20_000, 4));

        session.set_format(TargetFormat::Png);
        let artifact = session.convert().unwrap();
        assert_eq!(artifact.dimensions(), natural);
    }

    #[test]
    fn test_upload_resize_convert_download_scenario() {
        let dir = TempDir::new().unwrap();
        let session = session();

        let natural = session.load(jpeg_file(1000, 500)).unwrap();
        assert_eq!(natural, Dimensions::new(1000, 500));

        session.set_width(Some(500));
        assert_eq!(session.fields().height(), Some(250));

        session.set_format(TargetFormat::Webp);
        let artifact = session.convert().unwrap();
        assert_eq!(artifact.dimensions(), Dimensions::new(500, 250));
        assert_eq!(detect_format(artifact.bytes()).unwrap(), ImageFormat::WebP);

        let path = session.download(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "converted-image.webp");
        let (w, h) = image::image_dimensions(&path).unwrap();
        assert_eq!((w, h), (500, 250));
    }

    #[test]
    fn test_convert_without_dimensions_keeps_natural_size() {
        let session = session();
        session.load(jpeg_file(64, 48)).unwrap();
        session.set_width(None);
        for format in TargetFormat::ALL {
            session.set_format(format);
            let artifact = session.convert().unwrap();
            assert_eq!(artifact.dimensions(), Dimensions::new(64, 48));
        }
    }

    #[test]
    fn test_zero_byte_jpeg_is_decode_error_and_leaves_fields_empty() {
        let session = session();
        let err = session
            .load(PickedFile::from_bytes("empty.jpg", "image/jpeg", Vec::new()))
            .unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
        assert!(!session.has_source());
        assert_eq!(session.fields().width(), None);
        assert_eq!(session.fields().height(), None);
    }

    #[test]
    fn test_failed_load_keeps_previous_image() {
        let session = session();
        session.load(jpeg_file(30, 20)).unwrap();
        session.convert().unwrap();

        let bad = PickedFile::from_bytes("notes.txt", "text/plain", b"hello".to_vec());
        assert!(matches!(session.load(bad), Err(ImageError::InvalidType { .. })));

        assert_eq!(session.source().unwrap().natural(), Dimensions::new(30, 20));
        assert_eq!(session.fields().width(), Some(30));
        assert!(session.artifact().is_some());
    }

    #[test]
    fn test_oversized_file_never_loads() {
        let options = ConverterOptions { max_upload_bytes: 16, ..ConverterOptions::default() };
        let session = ConverterSession::new(options);
        assert!(matches!(session.load(jpeg_file(8, 8)), Err(ImageError::TooLarge { .. })));
        assert!(!session.has_source());
    }

    #[test]
    fn test_convert_requires_source() {
        assert!(matches!(session().convert(), Err(ImageError::NoSource)));
    }

    #[test]
    fn test_new_artifact_revokes_previous() {
        let session = session();
        session.load(jpeg_file(20, 10)).unwrap();

        let first = session.convert().unwrap();
        let second = session.convert().unwrap();

        let registry = session.registry();
        assert!(!registry.is_live(first.handle()));
        assert!(registry.is_live(second.handle()));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_reset_restores_fields_and_releases_artifact() {
        let session = session();
        session.load(jpeg_file(120, 80)).unwrap();
        session.set_width(Some(60));
        let artifact = session.convert().unwrap();

        session.reset();

        assert!(!session.has_source());
        assert!(session.artifact().is_none());
        assert!(!session.registry().is_live(artifact.handle()));
        assert_eq!(session.registry().live_count(), 0);
        assert_eq!(session.fields().width(), Some(120));
        assert_eq!(session.fields().height(), Some(80));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let session = session();
        session.reset();
        session.reset();
        assert!(!session.has_source());
        assert_eq!(session.fields().width(), None);
    }

    #[test]
    fn test_download_without_artifact_fails() {
        let dir = TempDir::new().unwrap();
        let session = session();
        session.load(jpeg_file(4, 4)).unwrap();
        assert!(matches!(
            session.download(dir.path()),
            Err(ImageError::Download { source: None, .. })
        ));
    }

    #[test]
    fn test_loading_new_source_releases_old_artifact() {
        let session = session();
        session.load(jpeg_file(10, 10)).unwrap();
        let artifact = session.convert().unwrap();

        session.load(jpeg_file(20, 5)).unwrap();
        assert!(session.artifact().is_none());
        assert!(!session.registry().is_live(artifact.handle()));
        assert_eq!(session.fields().width(), Some(20));
    }

    #[test]
    fn test_busy_session_rejects_second_conversion() {
        let session = session();
        session.load(jpeg_file(10, 10)).unwrap();

        let held = BusyGuard::acquire(&session.busy).unwrap();
        assert!(session.is_busy());
        assert!(matches!(session.convert(), Err(ImageError::Busy)));

        drop(held);
        assert!(!session.is_busy());
        assert!(session.convert().is_ok());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_busy_flag_released_after_failure() {
        let session = session();
        assert!(session.convert().is_err());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_result_discarded_when_source_reset_mid_conversion() {
        let session = session();
        session.load(jpeg_file(10, 10)).unwrap();

        let snapshot = session.snapshot().unwrap();
        let encoded =
            convert_image(snapshot.source.bitmap(), &snapshot.request, session.options()).unwrap();
        session.reset();

        assert!(matches!(session.install(&snapshot, encoded), Err(ImageError::SourceChanged)));
        assert!(session.artifact().is_none());
        assert_eq!(session.registry().live_count(), 0);
    }

    #[test]
    fn test_non_positive_field_is_dimension_error() {
        let session = session();
        session.load(jpeg_file(10, 10)).unwrap();
        session.set_maintain_aspect(false);
        session.set_width(Some(0));
        assert!(matches!(session.convert(), Err(ImageError::Dimension(_))));
        assert!(session.artifact().is_none());
    }

    #[test]
    fn test_session_is_shareable_across_threads() {
        let session = Arc::new(session());
        session.load(jpeg_file(16, 16)).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || session.convert())
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().any(|r| r.is_ok()));
        assert!(results
            .iter()
            .all(|r| matches!(r, Ok(_) | Err(ImageError::Busy))));
        assert_eq!(session.registry().live_count(), 1);
    }
}
