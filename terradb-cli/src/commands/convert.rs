use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use terradb::{Converter, ConverterBuilder};

pub fn run(
    db_dir: Option<PathBuf>,
    inputs: Vec<PathBuf>,
    zero_threshold: Option<u32>,
    quiet: bool,
) -> Result<()> {
    // Build the converter
    let mut builder = match db_dir {
        Some(dir) => Converter::builder(dir),
        None => ConverterBuilder::from_env().context(
            "TERRADB_DATA_DIR environment variable not set. Use --db-dir or set TERRADB_DATA_DIR",
        )?,
    };

    if let Some(threshold) = zero_threshold {
        builder = builder.zero_count_threshold(threshold);
    }
    let mut converter = builder.build();

    let surveys = collect_surveys(inputs)?;
    if surveys.is_empty() {
        bail!("No survey .flt files to convert");
    }

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(surveys.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let report = converter.convert_batch_with(&surveys, |input, result| {
        if let Err(e) = result {
            pb.suspend(|| eprintln!("skipped {}: {}", input.display(), e));
        }
        pb.inc(1);
    })?;
    pb.finish_with_message("done");

    println!("Converted {} survey file(s):", surveys.len());
    println!("  Blocks written: {}", report.wrote);
    if report.all_zero > 0 {
        println!("  All sea level (no file): {}", report.all_zero);
    }
    if report.missing > 0 {
        println!("  No usable data (no file): {}", report.missing);
    }
    if report.skipped > 0 {
        println!("  Skipped with errors: {}", report.skipped);
    }
    match (&report.index_blocks, &report.index_error) {
        (Some(count), _) => println!("  Status index rebuilt: {} block(s) present", count),
        (None, Some(e)) => eprintln!("  Status index NOT rebuilt: {} (index is stale)", e),
        (None, None) => {}
    }
    println!("  Database directory: {}", converter.db_dir().display());

    Ok(())
}

/// Expand the input list: files are taken as-is, directories are scanned
/// for `.flt` entries. The result is sorted for a stable processing order.
fn collect_surveys(inputs: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let mut surveys = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in std::fs::read_dir(&input)
                .with_context(|| format!("Failed to read directory {}", input.display()))?
                .flatten()
            {
                let path = entry.path();
                if path.extension().map(|e| e == "flt").unwrap_or(false) {
                    surveys.push(path);
                }
            }
        } else {
            surveys.push(input);
        }
    }
    surveys.sort();
    Ok(surveys)
}
