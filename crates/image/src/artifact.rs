//! Converted artifacts and the registry of live transient handles.
//!
//! A converted image is exposed under a `blob:` handle, the same way a
//! browser exposes a blob through an object URL. Handles stay live until
//! revoked; the session revokes the previous handle whenever it installs a
//! new artifact or resets.

use crate::dimensions::Dimensions;
use crate::download::download_file_name;
use crate::TargetFormat;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Transient reference to registered bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactHandle(String);

impl ArtifactHandle {
    fn generate() -> Self {
        Self(format!("blob:imgconv/{}", Uuid::new_v4()))
    }

    /// The handle as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live handles. Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    entries: Arc<Mutex<HashMap<ArtifactHandle, Arc<[u8]>>>>,
}

impl ArtifactRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<ArtifactHandle, Arc<[u8]>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register bytes under a fresh handle.
    pub fn register(&self, bytes: Arc<[u8]>) -> ArtifactHandle {
        let handle = ArtifactHandle::generate();
        self.entries().insert(handle.clone(), bytes);
        handle
    }

    /// Bytes behind a live handle.
    pub fn resolve(&self, handle: &ArtifactHandle) -> Option<Arc<[u8]>> {
        self.entries().get(handle).cloned()
    }

    /// Revoke a handle. Returns whether it was live.
    pub fn revoke(&self, handle: &ArtifactHandle) -> bool {
        let revoked = self.entries().remove(handle).is_some();
        if revoked {
            tracing::debug!(handle = %handle, "Artifact handle revoked");
        }
        revoked
    }

    /// Whether a handle is live.
    pub fn is_live(&self, handle: &ArtifactHandle) -> bool {
        self.entries().contains_key(handle)
    }

    /// Number of live handles.
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }
}

/// The result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConvertedArtifact {
    handle: ArtifactHandle,
    format: TargetFormat,
    dimensions: Dimensions,
    bytes: Arc<[u8]>,
}

impl ConvertedArtifact {
    /// Register encoded bytes and wrap them.
    pub fn register(
        registry: &ArtifactRegistry,
        bytes: Vec<u8>,
        format: TargetFormat,
        dimensions: Dimensions,
    ) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        let handle = registry.register(Arc::clone(&bytes));
        Self {
            handle,
            format,
            dimensions,
            bytes,
        }
    }

    /// Transient handle of this artifact.
    pub fn handle(&self) -> &ArtifactHandle {
        &self.handle
    }

    /// Output format.
    pub fn format(&self) -> TargetFormat {
        self.format
    }

    /// Media type of the bytes.
    pub fn media_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Size the image was drawn at.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Name the artifact is saved under.
    pub fn file_name(&self) -> String {
        download_file_name(self.format)
    }

    /// Serializable description.
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            handle: self.handle.clone(),
            format: self.format,
            media_type: self.media_type(),
            width: self.dimensions.width,
            height: self.dimensions.height,
            size_bytes: self.size_bytes(),
            file_name: self.file_name(),
        }
    }
}

/// Serializable description of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    /// Transient handle
    pub handle: ArtifactHandle,
    /// Output format
    pub format: TargetFormat,
    /// Media type
    pub media_type: &'static str,
    /// Output width
    pub width: u32,
    /// Output height
    pub height: u32,
    /// Encoded size
    pub size_bytes: usize,
    /// Download file name
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_resolve_revoke() {
        let registry = ArtifactRegistry::new();
        let handle = registry.register(Arc::from(vec![1u8, 2, 3]));

        assert!(handle.as_str().starts_with("blob:imgconv/"));
        assert!(registry.is_live(&handle));
        assert_eq!(registry.resolve(&handle).as_deref(), Some(&[1u8, 2, 3][..]));

        assert!(registry.revoke(&handle));
        assert!(!registry.is_live(&handle));
        assert!(registry.resolve(&handle).is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let registry = ArtifactRegistry::new();
        let handle = registry.register(Arc::from(vec![0u8]));
        assert!(registry.revoke(&handle));
        assert!(!registry.revoke(&handle));
    }

    #[test]
    fn test_handles_are_unique() {
        let registry = ArtifactRegistry::new();
        let a = registry.register(Arc::from(vec![0u8]));
        let b = registry.register(Arc::from(vec![0u8]));
        assert_ne!(a, b);
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn test_clones_share_entries() {
        let registry = ArtifactRegistry::new();
        let shared = registry.clone();
        let handle = registry.register(Arc::from(vec![9u8]));
        assert!(shared.is_live(&handle));
        shared.revoke(&handle);
        assert!(!registry.is_live(&handle));
    }

    #[test]
    fn test_artifact_summary() {
        let registry = ArtifactRegistry::new();
        let artifact = ConvertedArtifact::register(
            &registry,
            vec![0; 42],
            TargetFormat::Webp,
            Dimensions::new(500, 250),
        );

        let summary = artifact.summary();
        assert_eq!(summary.file_name, "converted-image.webp");
        assert_eq!(summary.media_type, "image/webp");
        assert_eq!((summary.width, summary.height), (500, 250));
        assert_eq!(summary.size_bytes, 42);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["format"], "webp");
        assert_eq!(json["handle"], artifact.handle().as_str());
    }
}
