//! Survey input ingestion.
//!
//! Raw elevation surveys arrive as GridFloat pairs: a `.flt` file of
//! row-major `f32` samples and a companion `.hdr` text file declaring the
//! grid shape and byte order. One pair covers one block, named by the block
//! convention (`n35w123.flt` + `n35w123.hdr`).
//!
//! The source format stores rows north-to-south and columns west-to-east,
//! with [`SOURCE_OVERLAP`] redundant rows/columns on every edge. Ingestion
//! reverses both axes into the [`ElevationGrid`]'s south-to-north,
//! east-to-west addressing, keeps [`GRID_MARGIN`](crate::grid::GRID_MARGIN)
//! of the overlap as infill context, and discards the rest.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{Result, TerrainError};
use crate::grid::{ElevationGrid, GRID_DIM, GRID_MARGIN, NO_DATA, POINTS_PER_DEGREE};

/// Redundant rows/columns on each edge of a survey grid.
pub const SOURCE_OVERLAP: usize = 6;

/// Expected survey rows = columns: one degree plus overlap on both edges.
pub const SOURCE_DIM: usize = POINTS_PER_DEGREE + 2 * SOURCE_OVERLAP;

/// Leading source rows/columns skipped before the kept region begins.
const SOURCE_SKIP: usize = SOURCE_OVERLAP - GRID_MARGIN;

/// Declared byte order of a survey `.flt` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyByteOrder {
    /// Little-endian samples (`LSBFIRST`).
    LsbFirst,
    /// Big-endian samples (`MSBFIRST`).
    MsbFirst,
}

/// Metadata parsed from a survey `.hdr` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyHeader {
    pub rows: usize,
    pub cols: usize,
    pub byte_order: SurveyByteOrder,
}

impl SurveyHeader {
    /// Parse header text.
    ///
    /// The format is one `KEY VALUE` pair per line, keys case insensitive.
    /// `nrows`, `ncols`, and `byteorder` are required; unknown keys are
    /// ignored (survey providers include projection fields this pipeline
    /// has no use for).
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows: Option<usize> = None;
        let mut cols: Option<usize> = None;
        let mut byte_order: Option<SurveyByteOrder> = None;

        for line in text.lines() {
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };

            match key.to_ascii_lowercase().as_str() {
                "nrows" => {
                    rows = Some(value.parse().map_err(|_| TerrainError::InvalidField {
                        field: "nrows",
                        value: value.to_string(),
                    })?);
                }
                "ncols" => {
                    cols = Some(value.parse().map_err(|_| TerrainError::InvalidField {
                        field: "ncols",
                        value: value.to_string(),
                    })?);
                }
                "byteorder" => {
                    byte_order = Some(match value.to_ascii_uppercase().as_str() {
                        "LSBFIRST" => SurveyByteOrder::LsbFirst,
                        "MSBFIRST" => SurveyByteOrder::MsbFirst,
                        _ => {
                            return Err(TerrainError::InvalidField {
                                field: "byteorder",
                                value: value.to_string(),
                            })
                        }
                    });
                }
                _ => {}
            }
        }

        Ok(Self {
            rows: rows.ok_or(TerrainError::MissingField { field: "nrows" })?,
            cols: cols.ok_or(TerrainError::MissingField { field: "ncols" })?,
            byte_order: byte_order.ok_or(TerrainError::MissingField { field: "byteorder" })?,
        })
    }

    /// Read and parse the header file at `path`.
    pub fn read_from(path: &Path) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }
}

/// Sanity window for raw survey elevations, in meters.
///
/// Anything outside the window is recorded as no-data. The bounds are
/// empirical constants carried over from the deployed pipeline; override
/// them through the converter builder, don't re-derive them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationWindow {
    pub floor_m: f32,
    pub ceiling_m: f32,
}

impl Default for ElevationWindow {
    fn default() -> Self {
        Self {
            floor_m: -1000.0,
            ceiling_m: 10000.0,
        }
    }
}

/// Populate `grid` from one survey `.flt` file.
///
/// `header` must already be parsed from the companion `.hdr`. The grid is
/// reset first, so the same buffer can be reused across input files.
///
/// # Errors
///
/// - [`TerrainError::GridDimension`] if the declared shape isn't
///   `SOURCE_DIM` square.
/// - [`TerrainError::ShortRead`] if the data file holds fewer bytes than
///   the declared shape requires.
/// - [`TerrainError::Io`] if the file cannot be opened or mapped.
///
/// All of these are per-file skips to the batch driver.
pub fn ingest(
    data_path: &Path,
    header: &SurveyHeader,
    window: &ElevationWindow,
    grid: &mut ElevationGrid,
) -> Result<()> {
    if header.rows != SOURCE_DIM || header.cols != SOURCE_DIM {
        return Err(TerrainError::GridDimension {
            rows: header.rows,
            cols: header.cols,
            expected: SOURCE_DIM,
        });
    }

    let file = File::open(data_path)?;
    // SAFETY: the mapping is read-only and private to this call; the survey
    // file is not expected to change during a conversion run.
    let map = unsafe { Mmap::map(&file)? };

    let needed = SOURCE_DIM * SOURCE_DIM * 4;
    if map.len() < needed {
        return Err(TerrainError::ShortRead {
            expected: needed,
            actual: map.len(),
        });
    }

    grid.reset();

    // Source rows run north-to-south, columns west-to-east; the grid runs
    // south-to-north, east-to-west. Both axes reverse during the copy.
    for s in 0..GRID_DIM {
        let src_row = SOURCE_SKIP + s;
        let row_base = src_row * SOURCE_DIM;
        let logical_row = (GRID_DIM - 1 - s) as i32 - GRID_MARGIN as i32;

        for k in 0..GRID_DIM {
            let src_col = SOURCE_SKIP + k;
            let off = (row_base + src_col) * 4;
            let bytes = [map[off], map[off + 1], map[off + 2], map[off + 3]];
            let value = match header.byte_order {
                SurveyByteOrder::LsbFirst => f32::from_le_bytes(bytes),
                SurveyByteOrder::MsbFirst => f32::from_be_bytes(bytes),
            };
            let logical_col = (GRID_DIM - 1 - k) as i32 - GRID_MARGIN as i32;

            let sample = if !value.is_finite() || value < window.floor_m || value > window.ceiling_m
            {
                NO_DATA
            } else {
                value.round() as i16
            };
            grid.set(logical_row, logical_col, sample);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_survey<F>(dir: &Path, stem: &str, order: SurveyByteOrder, sample: F)
    where
        F: Fn(usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(SOURCE_DIM * SOURCE_DIM * 4);
        for row in 0..SOURCE_DIM {
            for col in 0..SOURCE_DIM {
                let v = sample(row, col);
                let bytes = match order {
                    SurveyByteOrder::LsbFirst => v.to_le_bytes(),
                    SurveyByteOrder::MsbFirst => v.to_be_bytes(),
                };
                data.extend_from_slice(&bytes);
            }
        }
        let mut f = std::fs::File::create(dir.join(format!("{stem}.flt"))).unwrap();
        f.write_all(&data).unwrap();
    }

    #[test]
    fn test_parse_header() {
        let text = "ncols 1212\nnrows 1212\nxllcorner -71.005\nyllcorner 34.995\ncellsize 0.000833\nNODATA_value -9999\nbyteorder LSBFIRST\n";
        let header = SurveyHeader::parse(text).unwrap();
        assert_eq!(header.rows, 1212);
        assert_eq!(header.cols, 1212);
        assert_eq!(header.byte_order, SurveyByteOrder::LsbFirst);
    }

    #[test]
    fn test_parse_header_case_insensitive() {
        let header = SurveyHeader::parse("NROWS 1212\nNCOLS 1212\nBYTEORDER msbfirst\n").unwrap();
        assert_eq!(header.byte_order, SurveyByteOrder::MsbFirst);
    }

    #[test]
    fn test_parse_header_missing_field() {
        let err = SurveyHeader::parse("nrows 1212\nbyteorder LSBFIRST\n").unwrap_err();
        assert!(matches!(
            err,
            TerrainError::MissingField { field: "ncols" }
        ));
    }

    #[test]
    fn test_parse_header_bad_value() {
        let err = SurveyHeader::parse("nrows abc\nncols 1212\nbyteorder LSBFIRST\n").unwrap_err();
        assert!(matches!(err, TerrainError::InvalidField { field: "nrows", .. }));

        let err =
            SurveyHeader::parse("nrows 1212\nncols 1212\nbyteorder PDP11\n").unwrap_err();
        assert!(matches!(
            err,
            TerrainError::InvalidField { field: "byteorder", .. }
        ));
    }

    #[test]
    fn test_ingest_reverses_both_axes() {
        let tmp = TempDir::new().unwrap();
        // Distinct anchors at the data corners make the axis mapping visible.
        write_survey(tmp.path(), "n35w071", SurveyByteOrder::LsbFirst, |r, c| {
            match (r, c) {
                (6, 6) => 1111.0,       // north-west data corner
                (1206, 1206) => 2222.0, // south-east data corner
                (1206, 6) => 3333.0,    // south-west data corner
                _ => 10.0,
            }
        });

        let header = SurveyHeader {
            rows: SOURCE_DIM,
            cols: SOURCE_DIM,
            byte_order: SurveyByteOrder::LsbFirst,
        };
        let mut grid = ElevationGrid::new();
        ingest(
            &tmp.path().join("n35w071.flt"),
            &header,
            &ElevationWindow::default(),
            &mut grid,
        )
        .unwrap();

        // South-east data corner lands at logical (0, 0)
        assert_eq!(grid.get(0, 0), 2222);
        // North-west data corner lands at logical (1200, 1200)
        assert_eq!(grid.get(1200, 1200), 1111);
        // South-west corner: row 0, westmost column
        assert_eq!(grid.get(0, 1200), 3333);
        assert_eq!(grid.get(600, 600), 10);
    }

    #[test]
    fn test_ingest_big_endian() {
        let tmp = TempDir::new().unwrap();
        write_survey(tmp.path(), "n35w071", SurveyByteOrder::MsbFirst, |_, _| 42.4);

        let header = SurveyHeader {
            rows: SOURCE_DIM,
            cols: SOURCE_DIM,
            byte_order: SurveyByteOrder::MsbFirst,
        };
        let mut grid = ElevationGrid::new();
        ingest(
            &tmp.path().join("n35w071.flt"),
            &header,
            &ElevationWindow::default(),
            &mut grid,
        )
        .unwrap();

        assert_eq!(grid.get(0, 0), 42);
        assert_eq!(grid.get(1200, 1200), 42);
    }

    #[test]
    fn test_ingest_range_check_and_counters() {
        let tmp = TempDir::new().unwrap();
        write_survey(tmp.path(), "n35w071", SurveyByteOrder::LsbFirst, |r, c| {
            match (r, c) {
                (600, 600) => -9999.0, // provider void marker, outside window
                (600, 601) => 12000.0, // above ceiling
                (601, 600) => 0.4,     // rounds to zero
                _ => 0.0,
            }
        });

        let header = SurveyHeader {
            rows: SOURCE_DIM,
            cols: SOURCE_DIM,
            byte_order: SurveyByteOrder::LsbFirst,
        };
        let mut grid = ElevationGrid::new();
        ingest(
            &tmp.path().join("n35w071.flt"),
            &header,
            &ElevationWindow::default(),
            &mut grid,
        )
        .unwrap();

        assert!(grid.has_no_data());
        // Every in-window sample here rounds to zero
        assert_eq!(grid.zero_count(), (GRID_DIM * GRID_DIM) as u32 - 2);
        // Both out-of-window samples became the sentinel
        assert_eq!(grid.get(606, 606), NO_DATA);
        assert_eq!(grid.get(606, 605), NO_DATA);
    }

    #[test]
    fn test_ingest_wrong_dimensions() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("n35w071.flt"), [0u8; 16]).unwrap();

        let header = SurveyHeader {
            rows: 1200,
            cols: 1212,
            byte_order: SurveyByteOrder::LsbFirst,
        };
        let mut grid = ElevationGrid::new();
        let err = ingest(
            &tmp.path().join("n35w071.flt"),
            &header,
            &ElevationWindow::default(),
            &mut grid,
        )
        .unwrap_err();
        assert!(matches!(err, TerrainError::GridDimension { rows: 1200, .. }));
    }

    #[test]
    fn test_ingest_short_read() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("n35w071.flt"), vec![0u8; 1024]).unwrap();

        let header = SurveyHeader {
            rows: SOURCE_DIM,
            cols: SOURCE_DIM,
            byte_order: SurveyByteOrder::LsbFirst,
        };
        let mut grid = ElevationGrid::new();
        let err = ingest(
            &tmp.path().join("n35w071.flt"),
            &header,
            &ElevationWindow::default(),
            &mut grid,
        )
        .unwrap_err();
        assert!(matches!(err, TerrainError::ShortRead { actual: 1024, .. }));
    }
}
