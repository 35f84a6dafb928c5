//! Database block file writer.
//!
//! Assembles one block's 64 cell records and header. Cell bodies are
//! buffered in memory while metadata accumulates, then the file is written
//! with a single sequential header-then-body pass; there is no seek-back
//! header rewrite to race against.
//!
//! A block with nothing worth storing produces no file: if every cell is
//! no-data the block is classified [`WriteOutcome::Missing`], and if every
//! surviving cell is constant zero it is [`WriteOutcome::AllZero`] (the
//! query engine reconstructs such blocks as implicit sea level).

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::block::BlockId;
use crate::cell::{self, CELL_COUNT, CELL_POINTS, CELL_SAMPLES};
use crate::codec::{self, MAX_BIT_WIDTH};
use crate::error::Result;
use crate::format::{CellMeta, FileHeader, CODE_RAW, HEADER_LEN};
use crate::grid::ElevationGrid;

/// Classification of one block's write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every cell was constant zero elevation; no file written.
    AllZero,
    /// Every cell was no-data; no file written.
    Missing,
    /// A database file was written.
    WroteData {
        /// Cells flagged no-data in the written file, for diagnostics.
        no_data_cells: u32,
    },
}

/// Reusable buffers for block assembly.
///
/// Sized once to their worst case and handed back to the writer for every
/// block, keeping the conversion loop's memory footprint fixed.
pub struct BlockScratch {
    cell: Vec<i16>,
    packed: Vec<u8>,
    body: Vec<u8>,
}

impl BlockScratch {
    pub fn new() -> Self {
        Self {
            cell: Vec::with_capacity(CELL_SAMPLES),
            packed: Vec::with_capacity(CELL_SAMPLES * 2),
            body: Vec::with_capacity(CELL_COUNT * CELL_SAMPLES * 2),
        }
    }
}

impl Default for BlockScratch {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode one extracted cell into `packed`, returning its code and minimum.
///
/// Deltas wider than [`MAX_BIT_WIDTH`] bits fall back to raw little-endian
/// storage ([`CODE_RAW`]); the survey sanity window keeps real data well
/// inside the packable range, but the format must stay self-consistent for
/// any samples it is handed.
fn encode_cell(samples: &[i16], packed: &mut Vec<u8>) -> (u8, i16) {
    let mut min = samples[0];
    let mut max = samples[0];
    for &s in &samples[1..] {
        min = min.min(s);
        max = max.max(s);
    }

    if codec::bit_width((max as i32 - min as i32) as u32) > MAX_BIT_WIDTH {
        packed.clear();
        for &s in samples {
            packed.extend_from_slice(&s.to_le_bytes());
        }
        return (CODE_RAW, min);
    }

    let (min, width) = codec::pack(samples, packed);
    (width, min)
}

/// Build and write the database file for `block` from `grid`.
///
/// Returns the block's classification; [`WriteOutcome::AllZero`] and
/// [`WriteOutcome::Missing`] are expected non-error outcomes with no file
/// on disk. On a write failure the partial file is deleted before the
/// error propagates, so the database directory never holds a torn block.
pub fn write_block(
    db_dir: &Path,
    block: BlockId,
    grid: &ElevationGrid,
    scratch: &mut BlockScratch,
) -> Result<WriteOutcome> {
    let mut header = FileHeader::new(block);
    let mut no_data_cells = 0u32;
    let mut file_needed = false;
    scratch.body.clear();

    for index in 0..CELL_COUNT {
        if !cell::extract(grid, index, &mut scratch.cell) {
            header.cells[index] = CellMeta::NO_DATA;
            no_data_cells += 1;
            continue;
        }

        let (code, min) = encode_cell(&scratch.cell, &mut scratch.packed);
        header.cells[index] = CellMeta {
            code,
            min,
            rows: CELL_POINTS as u16,
            cols: CELL_POINTS as u16,
            len: scratch.packed.len() as u32,
            offset: (HEADER_LEN + scratch.body.len()) as u32,
        };
        scratch.body.extend_from_slice(&scratch.packed);

        // A cell earns the file once it stores anything beyond implicit
        // sea level.
        if code != 0 || min != 0 {
            file_needed = true;
        }
    }

    if no_data_cells as usize == CELL_COUNT {
        return Ok(WriteOutcome::Missing);
    }
    if !file_needed {
        return Ok(WriteOutcome::AllZero);
    }

    let path = db_dir.join(block.filename());
    if let Err(e) = write_file(&path, &header, &scratch.body) {
        let _ = fs::remove_file(&path);
        return Err(e.into());
    }

    Ok(WriteOutcome::WroteData { no_data_cells })
}

fn write_file(path: &Path, header: &FileHeader, body: &[u8]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    out.write_all(&header.encode())?;
    out.write_all(body)?;
    out.flush()
}
