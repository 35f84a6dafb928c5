//! # TERRADB - Terrain Database Builder
//!
//! Converts raw gridded elevation surveys into the compressed,
//! randomly-accessible terrain database consumed by a radio-propagation
//! study engine.
//!
//! ## Features
//!
//! - **Compact**: cells are delta-encoded and bit-packed to the minimum
//!   width their relief requires; flat water costs nothing at all
//! - **Randomly accessible**: a fixed header carries every cell's offset,
//!   and a global status index answers "is there data here?" without a
//!   file open
//! - **Fixed memory budget**: one elevation grid and one set of scratch
//!   buffers, allocated once and reused across an entire batch run
//! - **Coastal repair**: isolated sea-level voids in provider data are
//!   filled instead of knocking out whole cells
//!
//! ## Quick Start
//!
//! ```ignore
//! use terradb::Converter;
//!
//! let mut converter = Converter::new("/data/terrain");
//!
//! // Each survey pair (n35w123.flt + n35w123.hdr) becomes one block file
//! let report = converter.convert_batch(&inputs)?;
//! println!("{} blocks written, {} skipped", report.wrote, report.skipped);
//! ```
//!
//! ## Database Format
//!
//! One file per 1° × 1° block, named by the block's south-east corner
//! (`n05w070.trn`, longitude positive toward the west). Each file is a
//! 968-byte header plus 64 packed cell records; see [`format`] for the
//! byte-level layout and [`codec`] for the bitstream. A flat status index
//! (`terradb.idx`, one byte per block worldwide) records which blocks
//! exist.
//!
//! Survey inputs are GridFloat pairs: a `.flt` of row-major `f32` samples
//! and a `.hdr` declaring shape and byte order; see [`survey`].

pub mod block;
pub mod cell;
pub mod codec;
pub mod convert;
pub mod error;
pub mod format;
pub mod grid;
pub mod index;
pub mod infill;
pub mod survey;
pub mod writer;

// Re-export main types at crate root for convenience
pub use block::BlockId;
pub use convert::{BatchReport, Converter, ConverterBuilder, FileOutcome};
pub use error::{Result, TerrainError};
pub use grid::{ElevationGrid, NO_DATA};
pub use index::BlockIndex;
pub use writer::WriteOutcome;
