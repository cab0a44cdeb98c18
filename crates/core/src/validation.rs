//! Checks for configuration values and user-supplied options
//!
//! Every failed check is collected rather than stopping at the first, so a
//! bad config file is reported in one pass.
//!
//! # Example
//!
//! ```rust
//! use imgconv_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .one_of("theme", "dark", &["light", "dark"])
//!     .range("jpeg_quality", 92u8, 1, 100)
//!     .at_least("max_dimension", 4096u32, 1)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, ErrorCode, Result};
use serde::Serialize;
use std::fmt;

/// Which check a value failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Value outside an allowed set
    OneOf,
    /// Value outside an inclusive range
    Range,
    /// Value below a minimum
    AtLeast,
}

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Dotted path of the offending value, e.g. `conversion.jpeg_quality`
    pub field: String,
    /// Failed rule
    pub rule: Rule,
    /// What would have been accepted
    pub expected: String,
    /// What was found
    pub actual: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Rule::OneOf => write!(f, "{} must be one of {} (got {:?})", self.field, self.expected, self.actual),
            Rule::Range => write!(f, "{} must be between {} (got {})", self.field, self.expected, self.actual),
            Rule::AtLeast => write!(f, "{} must be at least {} (got {})", self.field, self.expected, self.actual),
        }
    }
}

/// Collected failures
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Whether every check passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failed checks, in the order they ran
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Turn failures into one error tagged with `code`.
    ///
    /// The message names the first failure; the context lists all of them.
    pub fn into_result(self, code: ErrorCode) -> Result<()> {
        let Some(first) = self.errors.first() else {
            return Ok(());
        };

        let mut err = Error::new(code, format!("Invalid setting: {}", first));
        if self.errors.len() > 1 {
            let all: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
            err = err.with_context(all.join("; "));
        }
        Err(err.with_suggestion("Fix the listed values or remove them to use the defaults"))
    }
}

/// Fluent validator builder
#[derive(Debug, Default)]
pub struct Validator {
    result: ValidationResult,
}

impl Validator {
    /// Start an empty set of checks
    pub fn new() -> Self {
        Self::default()
    }

    /// `value` must be one of `allowed`
    pub fn one_of(mut self, field: &str, value: &str, allowed: &[&str]) -> Self {
        if !allowed.contains(&value) {
            self.fail(field, Rule::OneOf, allowed.join(", "), value.to_string());
        }
        self
    }

    /// `value` must lie in `min..=max`
    pub fn range<T: PartialOrd + fmt::Display>(mut self, field: &str, value: T, min: T, max: T) -> Self {
        if value < min || value > max {
            self.fail(field, Rule::Range, format!("{min} and {max}"), value.to_string());
        }
        self
    }

    /// `value` must be `min` or more
    pub fn at_least<T: PartialOrd + fmt::Display>(mut self, field: &str, value: T, min: T) -> Self {
        if value < min {
            self.fail(field, Rule::AtLeast, min.to_string(), value.to_string());
        }
        self
    }

    /// Finish and return what failed
    pub fn validate(self) -> ValidationResult {
        self.result
    }

    fn fail(&mut self, field: &str, rule: Rule, expected: String, actual: String) {
        self.result.errors.push(ValidationError {
            field: field.to_string(),
            rule,
            expected,
            actual,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_of() {
        let result = Validator::new()
            .one_of("preferences.language", "klingon", &["en", "es", "fr"])
            .validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].rule, Rule::OneOf);
        assert_eq!(result.errors()[0].actual, "klingon");
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(Validator::new()
            .range("q", 1, 1, 100)
            .range("q", 100, 1, 100)
            .validate()
            .is_valid());

        let result = Validator::new().range("conversion.jpeg_quality", 150, 1, 100).validate();
        assert_eq!(result.errors()[0].rule, Rule::Range);
        assert_eq!(
            result.errors()[0].to_string(),
            "conversion.jpeg_quality must be between 1 and 100 (got 150)"
        );
    }

    #[test]
    fn test_at_least() {
        let result = Validator::new()
            .at_least("conversion.max_upload_bytes", 0u64, 1)
            .at_least("conversion.max_dimension", 1u32, 1)
            .validate();
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].field, "conversion.max_upload_bytes");
    }

    #[test]
    fn test_into_result_single_failure() {
        let err = Validator::new()
            .one_of("preferences.theme", "neon", &["light", "dark"])
            .validate()
            .into_result(ErrorCode::ConfigValidationError)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("preferences.theme"));
        assert!(err.context.is_none());
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_into_result_lists_every_failure() {
        let err = Validator::new()
            .one_of("preferences.language", "xx", &["en"])
            .range("conversion.jpeg_quality", 0u8, 1, 100)
            .validate()
            .into_result(ErrorCode::ConfigValidationError)
            .unwrap_err();
        let context = err.context.unwrap();
        assert!(context.contains("preferences.language"));
        assert!(context.contains("conversion.jpeg_quality"));
    }

    #[test]
    fn test_passing_checks_are_ok() {
        assert!(Validator::new()
            .one_of("preferences.theme", "light", &["light", "dark"])
            .at_least("conversion.max_dimension", 4096u32, 1)
            .validate()
            .into_result(ErrorCode::ConfigValidationError)
            .is_ok());
    }
}
