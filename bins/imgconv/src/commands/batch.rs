//! Batch command - convert every image in a directory

use super::target_format;
use imgconv_cli::output::{format_count, format_duration, Status};
use imgconv_cli::progress;
use imgconv_core::config::Config;
use imgconv_core::{Error, ErrorCode, Result};
use imgconv_image::batch::{convert_batch, BatchOutcome};
use imgconv_image::{is_accepted_media_type, media_type_for_path, ConversionRequest, ConverterOptions};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Arguments of `imgconv batch`
pub struct BatchArgs {
    pub dir: PathBuf,
    pub out_dir: PathBuf,
    pub format: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub recursive: bool,
}

/// Convert all accepted images under `dir` into `out_dir`
pub fn run(config: &Config, args: BatchArgs, json: bool) -> Result<()> {
    let conversion = &config.schema.conversion;
    let format = target_format(args.format.as_deref(), conversion)?;

    if !args.dir.is_dir() {
        return Err(Error::file_not_found(&args.dir).with_suggestion("Pass a directory of images"));
    }

    let inputs = collect_images(&args.dir, args.recursive);
    if inputs.is_empty() {
        if json {
            println!("[]");
        } else {
            Status::warning(format!("No images found in {}", args.dir.display()));
        }
        return Ok(());
    }

    let request = ConversionRequest {
        format,
        width: args.width,
        height: args.height,
        maintain_aspect: true,
    };
    let options = ConverterOptions::from(conversion);

    if !json {
        Status::info(format!(
            "Converting {} to {}",
            format_count(inputs.len(), "image", "images"),
            format.extension().to_uppercase()
        ));
    }

    let pb = if json {
        progress::hidden()
    } else {
        progress::file_progress(inputs.len() as u64)
    };

    let start = Instant::now();
    let outcomes = convert_batch(&inputs, &request, &options, &args.out_dir, |_| pb.inc(1));
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();

    if failed == 0 {
        progress::finish_success(&pb, "done");
    } else {
        progress::finish_error(&pb, &format!("{} failed", failed));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&json_outcomes(&outcomes))?);
    } else {
        print_summary(&outcomes, failed, start.elapsed());
    }

    if failed > 0 {
        return Err(Error::new(
            ErrorCode::ImageError,
            format!("{} of {} failed", format_count(failed, "image", "images"), inputs.len()),
        ));
    }
    Ok(())
}

/// Files under `dir` whose extension maps to an accepted media type, sorted
fn collect_images(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| media_type_for_path(p).is_some_and(is_accepted_media_type))
        .collect();
    files.sort();
    files
}

fn json_outcomes(outcomes: &[BatchOutcome]) -> Vec<serde_json::Value> {
    outcomes
        .iter()
        .map(|o| match &o.result {
            Ok((output, dims)) => serde_json::json!({
                "input": o.input,
                "output": output,
                "width": dims.width,
                "height": dims.height,
            }),
            Err(e) => serde_json::json!({
                "input": o.input,
                "error": e.to_string(),
            }),
        })
        .collect()
}

fn print_summary(outcomes: &[BatchOutcome], failed: usize, elapsed: std::time::Duration) {
    println!();
    for outcome in outcomes {
        if let Err(e) = &outcome.result {
            Status::error(format!("{}: {}", outcome.input.display(), e));
        }
    }

    let converted = outcomes.len() - failed;
    Status::success(format!(
        "Converted {} in {}",
        format_count(converted, "image", "images"),
        format_duration(elapsed)
    ));
    if failed > 0 {
        Status::warning(format!("{} could not be converted", format_count(failed, "image", "images")));
    }
}
