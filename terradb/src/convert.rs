//! High-level conversion pipeline.
//!
//! [`Converter`] owns every large transient buffer the pipeline needs (the
//! elevation grid and the block assembly scratch), sized once and reused
//! across input files — a long batch run allocates no per-file buffers.
//! One survey pair flows through ingest → coastal infill → per-cell
//! extract/pack → block write, strictly one file at a time.
//!
//! # Example
//!
//! ```ignore
//! use terradb::Converter;
//!
//! let mut converter = Converter::new("/data/terrain");
//! let report = converter.convert_batch(&inputs)?;
//! println!("{} blocks written", report.wrote);
//! ```

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::block::BlockId;
use crate::error::{Result, TerrainError};
use crate::grid::ElevationGrid;
use crate::index::BlockIndex;
use crate::infill::{self, DEFAULT_NEAR_SEA_BAND, DEFAULT_ZERO_COUNT_THRESHOLD};
use crate::survey::{self, ElevationWindow, SurveyHeader};
use crate::writer::{self, BlockScratch, WriteOutcome};

/// Result of converting one survey pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOutcome {
    /// Block the survey covered.
    pub block: BlockId,
    /// The write classification for the block.
    pub outcome: WriteOutcome,
    /// Samples repaired by the coastal infill pass.
    pub infilled: u32,
}

/// Tallies for one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Blocks written with data.
    pub wrote: u32,
    /// Blocks classified all-zero (no file).
    pub all_zero: u32,
    /// Blocks classified all-missing (no file).
    pub missing: u32,
    /// Inputs skipped with an error.
    pub skipped: u32,
    /// Blocks present in the rebuilt index, if the rebuild succeeded.
    pub index_blocks: Option<usize>,
    /// The index rebuild/write failure, if any. A stale index is
    /// preferable to failing an otherwise successful run.
    pub index_error: Option<TerrainError>,
}

/// Terrain database conversion driver.
pub struct Converter {
    db_dir: PathBuf,
    window: ElevationWindow,
    near_sea: RangeInclusive<i16>,
    zero_count_threshold: u32,
    grid: ElevationGrid,
    scratch: BlockScratch,
}

impl Converter {
    /// Create a converter writing into `db_dir`, with default thresholds.
    pub fn new<P: AsRef<Path>>(db_dir: P) -> Self {
        Self::builder(db_dir).build()
    }

    /// Create a builder for threshold configuration.
    pub fn builder<P: AsRef<Path>>(db_dir: P) -> ConverterBuilder {
        ConverterBuilder::new(db_dir)
    }

    /// The database directory this converter writes into.
    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }

    /// Convert one survey `.flt` file (its `.hdr` companion is located by
    /// swapping the extension).
    ///
    /// The block is derived from the filename stem, which must follow the
    /// block naming convention (`n35w123.flt`).
    ///
    /// # Errors
    ///
    /// Every error from this method is a per-file condition; the batch
    /// driver records it and moves on.
    pub fn convert_file(&mut self, survey_path: &Path) -> Result<FileOutcome> {
        let block = survey_path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(BlockId::parse)
            .ok_or_else(|| TerrainError::BadBlockName {
                path: survey_path.to_path_buf(),
            })?;

        let header = SurveyHeader::read_from(&survey_path.with_extension("hdr"))?;
        survey::ingest(survey_path, &header, &self.window, &mut self.grid)?;
        let infilled =
            infill::repair_coastal(&mut self.grid, &self.near_sea, self.zero_count_threshold);
        let outcome = writer::write_block(&self.db_dir, block, &self.grid, &mut self.scratch)?;

        Ok(FileOutcome {
            block,
            outcome,
            infilled,
        })
    }

    /// Convert a batch of survey files, then rebuild the status index.
    ///
    /// Per-file failures are tallied as skips; the only fatal error is
    /// failing to create the database directory itself. The index rebuild
    /// runs strictly after the last write so it observes the final
    /// directory state.
    pub fn convert_batch(&mut self, inputs: &[PathBuf]) -> Result<BatchReport> {
        self.convert_batch_with(inputs, |_, _| {})
    }

    /// [`Self::convert_batch`] with a per-file callback, for progress
    /// reporting.
    pub fn convert_batch_with<F>(&mut self, inputs: &[PathBuf], mut on_file: F) -> Result<BatchReport>
    where
        F: FnMut(&Path, &Result<FileOutcome>),
    {
        fs::create_dir_all(&self.db_dir)?;

        let mut report = BatchReport::default();
        for input in inputs {
            let result = self.convert_file(input);
            match &result {
                Ok(outcome) => match outcome.outcome {
                    WriteOutcome::WroteData { .. } => report.wrote += 1,
                    WriteOutcome::AllZero => report.all_zero += 1,
                    WriteOutcome::Missing => report.missing += 1,
                },
                Err(_) => report.skipped += 1,
            }
            on_file(input, &result);
        }

        match BlockIndex::rebuild(&self.db_dir)
            .and_then(|index| index.write_to(&self.db_dir).map(|_| index))
        {
            Ok(index) => report.index_blocks = Some(index.block_count()),
            Err(e) => report.index_error = Some(e),
        }

        Ok(report)
    }
}

/// Builder for [`Converter`] threshold configuration.
///
/// The defaults are the empirically chosen constants the deployed pipeline
/// runs with; they are exposed here so operators can adjust them without a
/// rebuild of the tool.
pub struct ConverterBuilder {
    db_dir: PathBuf,
    window: ElevationWindow,
    near_sea: RangeInclusive<i16>,
    zero_count_threshold: u32,
}

impl ConverterBuilder {
    /// Builder with default thresholds.
    pub fn new<P: AsRef<Path>>(db_dir: P) -> Self {
        Self {
            db_dir: db_dir.as_ref().to_path_buf(),
            window: ElevationWindow::default(),
            near_sea: DEFAULT_NEAR_SEA_BAND,
            zero_count_threshold: DEFAULT_ZERO_COUNT_THRESHOLD,
        }
    }

    /// Builder configured from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `TERRADB_DATA_DIR` | Database directory | Required |
    /// | `TERRADB_ZERO_THRESHOLD` | Coastal infill zero-count gate | 1000 |
    ///
    /// # Errors
    ///
    /// Returns an error if `TERRADB_DATA_DIR` is not set.
    pub fn from_env() -> Result<Self> {
        let db_dir = std::env::var("TERRADB_DATA_DIR").map_err(|_| {
            TerrainError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "TERRADB_DATA_DIR environment variable not set",
            ))
        })?;

        let mut builder = Self::new(db_dir);
        if let Some(threshold) = std::env::var("TERRADB_ZERO_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            builder.zero_count_threshold = threshold;
        }
        Ok(builder)
    }

    /// Set the database directory.
    pub fn db_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.db_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the survey elevation sanity window, in meters.
    pub fn elevation_window(mut self, floor_m: f32, ceiling_m: f32) -> Self {
        self.window = ElevationWindow { floor_m, ceiling_m };
        self
    }

    /// Set the elevation band treated as sea level by the infill pass.
    pub fn near_sea_band(mut self, band: RangeInclusive<i16>) -> Self {
        self.near_sea = band;
        self
    }

    /// Set the zero-sample count above which a grid is treated as coastal.
    pub fn zero_count_threshold(mut self, threshold: u32) -> Self {
        self.zero_count_threshold = threshold;
        self
    }

    /// Build the [`Converter`], allocating its reusable buffers.
    pub fn build(self) -> Converter {
        Converter {
            db_dir: self.db_dir,
            window: self.window,
            near_sea: self.near_sea,
            zero_count_threshold: self.zero_count_threshold,
            grid: ElevationGrid::new(),
            scratch: BlockScratch::new(),
        }
    }
}
