//! Prefs command - show or persist user preferences

use imgconv_cli::output::Status;
use imgconv_core::config::{AdsConsent, Config, Theme};
use imgconv_core::{ErrorCode, Result};

/// Arguments of `imgconv prefs`
pub struct PrefsArgs {
    pub language: Option<String>,
    pub theme: Option<Theme>,
    pub consent: Option<AdsConsent>,
    pub default_format: Option<String>,
}

impl PrefsArgs {
    fn is_empty(&self) -> bool {
        self.language.is_none()
            && self.theme.is_none()
            && self.consent.is_none()
            && self.default_format.is_none()
    }
}

/// Apply any given changes and save, or print the current settings
pub fn run(mut config: Config, args: PrefsArgs, json: bool) -> Result<()> {
    if args.is_empty() {
        return show(&config, json);
    }

    let prefs = &mut config.schema.preferences;
    if let Some(language) = args.language {
        prefs.language = language.to_ascii_lowercase();
    }
    if let Some(theme) = args.theme {
        prefs.theme = theme;
    }
    if let Some(consent) = args.consent {
        prefs.ads_consent = Some(consent);
    }
    if let Some(format) = args.default_format {
        config.schema.conversion.default_format = format.to_ascii_lowercase();
    }

    config
        .schema
        .validate()
        .into_result(ErrorCode::ConfigValidationError)?;

    let path = config.save(None)?;

    if json {
        let output = serde_json::json!({
            "path": path,
            "preferences": config.schema.preferences,
            "default_format": config.schema.conversion.default_format,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        Status::success(format!("Preferences saved to {}", path.display()));
    }
    Ok(())
}

fn show(config: &Config, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.schema)?);
        return Ok(());
    }

    match &config.path {
        Some(path) => Status::info(format!("Loaded from {}", path.display())),
        None => Status::info("Using defaults (no configuration file found)"),
    }
    println!("{}", toml::to_string_pretty(&config.schema)?);
    Ok(())
}
