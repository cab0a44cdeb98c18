//! Configuration schema definitions
//!
//! User preferences and conversion defaults, read once at startup.

use crate::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Languages the interface can be switched to
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "fr", "de", "zh", "ja"];

/// Output format names accepted as `default_format`
pub const OUTPUT_FORMAT_NAMES: &[&str] = &["png", "jpeg", "jpg", "webp", "gif", "bmp"];

/// Upload ceiling used when none is configured (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Largest edge a conversion surface may have by default
pub const DEFAULT_MAX_DIMENSION: u32 = 16_384;

/// Root configuration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// User preferences
    #[serde(default)]
    pub preferences: PreferencesConfig,

    /// Conversion defaults
    #[serde(default)]
    pub conversion: ConversionConfig,
}

impl ConfigSchema {
    /// Check every value against its allowed set or range
    pub fn validate(&self) -> ValidationResult {
        let conv = &self.conversion;
        Validator::new()
            .one_of("preferences.language", &self.preferences.language, SUPPORTED_LANGUAGES)
            .one_of(
                "conversion.default_format",
                &conv.default_format.to_ascii_lowercase(),
                OUTPUT_FORMAT_NAMES,
            )
            .range("conversion.jpeg_quality", conv.jpeg_quality, 1, 100)
            .at_least("conversion.max_upload_bytes", conv.max_upload_bytes, 1)
            .at_least("conversion.max_dimension", conv.max_dimension, 1)
            .validate()
    }
}

/// Interface color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background
    #[default]
    Light,
    /// Dark background
    Dark,
}

/// Recorded answer to the ad consent prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdsConsent {
    /// Personalized ads allowed
    Personalized,
    /// Only non-personalized ads
    NonPersonalized,
}

/// Persisted user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Interface language code
    #[serde(default = "default_language")]
    pub language: String,

    /// Color theme
    #[serde(default)]
    pub theme: Theme,

    /// Ad consent; `None` until the user has answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ads_consent: Option<AdsConsent>,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            theme: Theme::default(),
            ads_consent: None,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

/// Conversion defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Output format used when none is given on the command line
    #[serde(default = "default_format")]
    pub default_format: String,

    /// JPEG encoder quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// RGB color transparent pixels are flattened onto for formats without alpha
    #[serde(default = "default_background")]
    pub background: [u8; 3],

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Largest accepted output edge in pixels
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Whether width/height edits keep the source aspect ratio
    #[serde(default = "default_true")]
    pub maintain_aspect: bool,

    /// Directory converted images are saved to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            jpeg_quality: default_jpeg_quality(),
            background: default_background(),
            max_upload_bytes: default_max_upload_bytes(),
            max_dimension: default_max_dimension(),
            maintain_aspect: true,
            output_dir: None,
        }
    }
}

fn default_format() -> String {
    "png".to_string()
}

fn default_jpeg_quality() -> u8 {
    92
}

fn default_background() -> [u8; 3] {
    [255, 255, 255]
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_max_dimension() -> u32 {
    DEFAULT_MAX_DIMENSION
}

fn default_true() -> bool {
    true
}
