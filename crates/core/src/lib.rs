//! Core utilities for imgconv
//!
//! This crate provides functionality shared by the converter library and the
//! command-line front end:
//!
//! - **Error handling**: errors with codes, context and recovery suggestions
//! - **Configuration**: TOML-based preferences and conversion defaults
//! - **Validation**: fluent checks for configuration and user input
//!
//! # Example
//!
//! ```rust,no_run
//! use imgconv_core::config::Config;
//!
//! let config = Config::load(None).expect("config should load");
//! println!("language: {}", config.schema.preferences.language);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Category, Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, ConversionConfig, PreferencesConfig};
    pub use crate::error::{exit_codes, Category, Error, ErrorCode, Result};
    pub use crate::validation::{ValidationResult, Validator};
}
