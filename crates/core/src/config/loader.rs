//! Configuration file loading and saving

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

const FILE_NAME: &str = "imgconv.toml";

/// Configuration wrapper
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Parsed and validated settings
    pub schema: ConfigSchema,
    /// File the settings were read from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or the standard locations, else defaults.
    ///
    /// An explicit path that does not exist is an error; a missing file in the
    /// standard locations is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = match &config_path {
            Some(p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        schema
            .validate()
            .into_result(ErrorCode::ConfigValidationError)
            .map_err(|e| match &config_path {
                Some(p) => {
                    let context = match &e.context {
                        Some(all) => format!("In {}: {}", p.display(), all),
                        None => format!("In {}", p.display()),
                    };
                    e.with_context(context)
                }
                None => e,
            })?;

        tracing::debug!(
            path = ?config_path,
            language = %schema.preferences.language,
            "Configuration loaded"
        );

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Write the configuration back to disk.
    ///
    /// Writes to `path` if given, else the file it was loaded from, else the
    /// per-user config file. Returns the path written.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let target = path
            .map(Path::to_path_buf)
            .or_else(|| self.path.clone())
            .or_else(user_config_path)
            .ok_or_else(|| {
                Error::config("No configuration directory available")
                    .with_suggestion("Pass --config to choose where preferences are stored")
            })?;

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self.schema)?;
        std::fs::write(&target, content).map_err(|e| {
            Error::new(
                ErrorCode::WriteFailed,
                format!("Failed to write config file {}", target.display()),
            )
            .with_source(e)
        })?;

        tracing::info!(path = %target.display(), "Configuration saved");
        Ok(target)
    }
}

/// Per-user configuration file location
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("imgconv").join("config.toml"))
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let local = [PathBuf::from(".imgconv.toml"), PathBuf::from(FILE_NAME)];

    local
        .into_iter()
        .chain(user_config_path())
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::new(
            ErrorCode::ConfigError,
            format!("Failed to read config file {}", path.display()),
        )
        .with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("In {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.conversion.max_upload_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("imgconv.toml");
        std::fs::write(&path, "[preferences]\nlanguage = \"fr\"\ntheme = \"dark\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.schema.preferences.language, "fr");
        assert_eq!(config.schema.preferences.theme, Theme::Dark);
        assert_eq!(config.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("imgconv.toml");
        std::fs::write(&path, "[conversion]\njpeg_quality = 0\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("imgconv.toml");
        std::fs::write(&path, "[preferences\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.schema.preferences.language = "ja".to_string();
        let written = config.save(Some(&path)).unwrap();
        assert_eq!(written, path);

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded.schema, config.schema);
    }
}
