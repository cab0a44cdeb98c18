//! Convert command - one image through the full pipeline

use super::target_format;
use imgconv_cli::output::{format_duration, format_file_size, Status};
use imgconv_cli::progress;
use imgconv_core::config::Config;
use imgconv_core::Result;
use imgconv_image::{ConverterOptions, ConverterSession, PickedFile};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments of `imgconv convert`
pub struct ConvertArgs {
    pub path: PathBuf,
    pub format: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub no_aspect: bool,
    pub media_type: Option<String>,
    pub out_dir: Option<PathBuf>,
}

/// Load, resize, re-encode and save one image
pub fn run(config: &Config, args: ConvertArgs, json: bool) -> Result<()> {
    let conversion = &config.schema.conversion;
    let format = target_format(args.format.as_deref(), conversion)?;

    let session = ConverterSession::new(ConverterOptions::from(conversion));
    session.set_format(format);

    let mut file = PickedFile::from_path(&args.path)?;
    if let Some(media_type) = args.media_type {
        file = file.with_media_type(media_type);
    }
    let natural = session.load(file)?;

    // Both edges given means the caller chose the shape.
    let both = args.width.is_some() && args.height.is_some();
    session.set_maintain_aspect(conversion.maintain_aspect && !args.no_aspect && !both);
    if args.width.is_some() {
        session.set_width(args.width);
    }
    if args.height.is_some() {
        session.set_height(args.height);
    }

    let pb = if json {
        progress::hidden()
    } else {
        progress::spinner(&format!("Converting to {}...", format.extension().to_uppercase()))
    };

    let start = Instant::now();
    let artifact = match session.convert() {
        Ok(artifact) => {
            pb.finish_and_clear();
            artifact
        }
        Err(e) => {
            progress::finish_error(&pb, "Conversion failed");
            return Err(e.into());
        }
    };
    let elapsed = start.elapsed();

    let out_dir = args
        .out_dir
        .or_else(|| conversion.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let saved = session.download(&out_dir)?;

    if json {
        let output = serde_json::json!({
            "input": args.path,
            "source": {
                "width": natural.width,
                "height": natural.height,
            },
            "artifact": artifact.summary(),
            "path": saved,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        Status::success(format!("Saved {}", saved.display()));
        Status::field("Source", natural);
        Status::field("Output", artifact.dimensions());
        Status::field("Format", artifact.media_type());
        Status::field("Size", format_file_size(artifact.size_bytes() as u64));
        Status::field("Time", format_duration(elapsed));
    }

    session.reset();
    Ok(())
}
