//! Info command - report format and dimensions

use imgconv_cli::output::{format_file_size, Status};
use imgconv_core::{Error, ErrorCode, Result};
use imgconv_image::{is_accepted_media_type, media_type_for_path, probe_metadata};
use std::path::Path;

/// Print what the decoder can tell about `path` without decoding pixels
pub fn run(path: &Path, json: bool) -> Result<()> {
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }

    let data = std::fs::read(path).map_err(|e| {
        Error::new(ErrorCode::ReadFailed, format!("Failed to read {}", path.display())).with_source(e)
    })?;
    let meta = probe_metadata(&data)?;
    let declared = media_type_for_path(path);
    let accepted = declared.is_some_and(is_accepted_media_type);

    if json {
        let output = serde_json::json!({
            "path": path,
            "format": meta.format,
            "media_type": meta.format.mime_type(),
            "declared_type": declared,
            "accepted": accepted,
            "width": meta.width,
            "height": meta.height,
            "aspect_ratio": meta.aspect_ratio(),
            "orientation": meta.orientation(),
            "size_bytes": meta.size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    Status::header(path.display());
    Status::field("Format", meta.format.mime_type());
    Status::field("Dimensions", format!("{}x{}", meta.width, meta.height));
    Status::field("Aspect ratio", format!("{:.3}", meta.aspect_ratio()));
    Status::field("Orientation", meta.orientation());
    Status::field("Size", format_file_size(meta.size_bytes as u64));
    if !accepted {
        Status::warning(format!(
            "Declared type {} is not accepted for conversion",
            declared.unwrap_or("unknown")
        ));
    }
    Ok(())
}
