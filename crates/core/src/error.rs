//! Application error handling with codes, context and recovery suggestions
//!
//! Every failure the converter can surface to a user is mapped onto an
//! [`Error`] carrying:
//! - a numeric [`ErrorCode`] whose thousands digit is its [`Category`]
//! - optional context (which file, which action)
//! - a recovery suggestion shown next to the message
//! - a serializable [`ErrorReport`] for `--json` output and structured logs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum ErrorCode {
    // General (1xxx)
    Unknown = 1000,
    Internal = 1001,

    // IO (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,
    ReadFailed = 2003,
    WriteFailed = 2004,

    // Configuration (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    ConfigValidationError = 3003,

    // Validation (6xxx)
    ValidationError = 6000,
    InvalidInput = 6001,
    InvalidFileType = 6002,
    FileTooLarge = 6003,
    InvalidDimensions = 6004,

    // Image pipeline (7xxx)
    ImageError = 7000,
    DecodeFailed = 7001,
    EncodeFailed = 7002,
    NoImageLoaded = 7003,
    NoConvertedImage = 7004,
    ConversionInProgress = 7005,
    SourceChanged = 7006,
}

/// Error category, taken from the thousands digit of an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Anything not covered below
    General,
    /// Reading or writing files
    Io,
    /// Loading or validating the config file
    Config,
    /// Rejected input: type, size, dimensions, option values
    Validation,
    /// Decoding, encoding and session state
    Image,
}

impl Category {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Io => "IO",
            Category::Config => "Configuration",
            Category::Validation => "Validation",
            Category::Image => "Image",
        }
    }

    /// Process exit status for failures in this category
    pub fn exit_code(&self) -> i32 {
        match self {
            Category::General => exit_codes::FAILURE,
            Category::Io => exit_codes::IO_ERROR,
            Category::Config => exit_codes::CONFIG_ERROR,
            Category::Validation => exit_codes::VALIDATION_ERROR,
            Category::Image => exit_codes::IMAGE_ERROR,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ErrorCode {
    /// Numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Category this code belongs to
    pub fn category(&self) -> Category {
        match self.code() / 1000 {
            2 => Category::Io,
            3 => Category::Config,
            6 => Category::Validation,
            7 => Category::Image,
            _ => Category::General,
        }
    }

    /// Process exit status for this code
    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    /// A path given on the command line does not exist
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Check that the path exists and you have read permissions")
    }

    /// Generic configuration failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// An explicitly requested config file does not exist
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create the file (an empty one uses the defaults) or drop --config")
    }
}

/// Serializable error report for `--json` output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: Category,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit statuses
#[allow(missing_docs)]
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const IO_ERROR: i32 = 4;
    pub const IMAGE_ERROR: i32 = 5;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

// Only output rendering goes through serde_json.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::Internal, format!("Failed to render JSON output: {}", err))
            .with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_suggestion("Check the file against the [preferences] and [conversion] tables")
            .with_source(err)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::new(ErrorCode::ConfigError, format!("TOML write error: {}", err)).with_source(err)
    }
}
