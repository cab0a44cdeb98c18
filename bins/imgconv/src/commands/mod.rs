//! CLI command implementations

pub mod batch;
pub mod convert;
pub mod info;
pub mod prefs;

use imgconv_core::config::ConversionConfig;
use imgconv_core::Result;
use imgconv_image::TargetFormat;

/// Output format from the command line, else the configured default.
pub(crate) fn target_format(arg: Option<&str>, conversion: &ConversionConfig) -> Result<TargetFormat> {
    let name = arg.unwrap_or(&conversion.default_format);
    Ok(name.parse::<TargetFormat>()?)
}
