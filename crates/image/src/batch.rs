//! Parallel conversion of many files.
//!
//! Each file runs through its own intake and conversion; a failure is
//! recorded against that file and the rest of the batch carries on.

use crate::convert::{convert_image, ConversionRequest, ConverterOptions};
use crate::dimensions::Dimensions;
use crate::intake::{load_image, PickedFile};
use crate::{ImageError, Result, TargetFormat};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Outcome for one input file.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Input path
    pub input: PathBuf,
    /// Output path and drawn size, or why the file failed
    pub result: Result<(PathBuf, Dimensions)>,
}

impl BatchOutcome {
    /// Whether the file converted.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Output paths for `inputs`: `<stem>.<ext>` in `out_dir`, suffixed with
/// `-1`, `-2`, ... when two inputs share a stem.
pub fn output_paths(inputs: &[PathBuf], format: TargetFormat, out_dir: &Path) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let mut candidate = format!("{}.{}", stem, format.extension());
            let mut n = 1;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{}-{}.{}", stem, n, format.extension());
                n += 1;
            }
            out_dir.join(candidate)
        })
        .collect()
}

/// Convert every input into `out_dir`, in parallel.
///
/// `on_done` is called once per file as it finishes, from worker threads.
pub fn convert_batch<F>(
    inputs: &[PathBuf],
    request: &ConversionRequest,
    options: &ConverterOptions,
    out_dir: &Path,
    on_done: F,
) -> Vec<BatchOutcome>
where
    F: Fn(&BatchOutcome) + Sync,
{
    let outputs = output_paths(inputs, request.format, out_dir);

    inputs
        .par_iter()
        .zip(outputs.par_iter())
        .map(|(input, output)| {
            let outcome = BatchOutcome {
                input: input.clone(),
                result: convert_one(input, output, request, options),
            };
            if let Err(e) = &outcome.result {
                tracing::warn!(
                    action = "batch",
                    file_name = %input.display(),
                    kind = ?e.kind(),
                    error = %e,
                    "Batch item failed"
                );
            }
            on_done(&outcome);
            outcome
        })
        .collect()
}

fn convert_one(
    input: &Path,
    output: &Path,
    request: &ConversionRequest,
    options: &ConverterOptions,
) -> Result<(PathBuf, Dimensions)> {
    let source = load_image(PickedFile::from_path(input)?, options.max_upload_bytes)?;
    let encoded = convert_image(source.bitmap(), request, options)?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ImageError::Download {
            message: format!("cannot create {}", parent.display()),
            source: Some(e),
        })?;
    }
    std::fs::write(output, &encoded.bytes).map_err(|e| ImageError::Download {
        message: format!("cannot write {}", output.display()),
        source: Some(e),
    })?;

    Ok((output.to_path_buf(), encoded.dimensions))
}
