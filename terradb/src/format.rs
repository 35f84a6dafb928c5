//! On-disk layout of a database block file.
//!
//! Every `.trn` file is a fixed 968-byte header followed by the cells'
//! packed records concatenated in cell-index order. All header integers are
//! little-endian.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ magic "TDB1" (4B)                                    │
//! │ block latitude (i16) │ block longitude, west+ (i16)  │
//! ├──────────────────────────────────────────────────────┤
//! │ compression code, 64 × u8                            │
//! │ minimum elevation,  64 × i16                         │
//! │ row count,          64 × u16                         │
//! │ column count,       64 × u16                         │
//! │ record byte length, 64 × u32                         │
//! │ record byte offset, 64 × u32                         │
//! ├──────────────────────────────────────────────────────┤
//! │ packed cell records, cell-index order                │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Compression codes: 0 = constant cell (minimum alone reconstructs it),
//! 1..=15 = packed delta width, 16 = raw little-endian `i16` samples,
//! 0xFF = no data. A no-data cell stores zeros in every other field and
//! contributes no record bytes.

use crate::block::BlockId;
use crate::cell::CELL_COUNT;
use crate::error::{Result, TerrainError};

/// File magic, "TDB1" on disk. Doubles as the format version marker.
pub const MAGIC: u32 = 0x3142_4454;

/// Fixed header length in bytes.
pub const HEADER_LEN: usize = 8 + CELL_COUNT * 15;

/// Compression code for a constant cell.
pub const CODE_CONSTANT: u8 = 0;

/// Compression code for raw (uncompressed) little-endian `i16` samples.
pub const CODE_RAW: u8 = 16;

/// Compression code for a cell with no usable data.
pub const CODE_NO_DATA: u8 = 0xFF;

/// Header entry for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMeta {
    pub code: u8,
    pub min: i16,
    pub rows: u16,
    pub cols: u16,
    pub len: u32,
    pub offset: u32,
}

impl CellMeta {
    /// Entry for a cell with no usable data.
    pub const NO_DATA: CellMeta = CellMeta {
        code: CODE_NO_DATA,
        min: 0,
        rows: 0,
        cols: 0,
        len: 0,
        offset: 0,
    };

    /// Whether this cell carries data (possibly an empty constant record).
    pub fn has_data(&self) -> bool {
        self.code != CODE_NO_DATA
    }
}

/// Decoded header of a block file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub block: BlockId,
    pub cells: [CellMeta; CELL_COUNT],
}

impl FileHeader {
    /// Header with every cell flagged no-data.
    pub fn new(block: BlockId) -> Self {
        Self {
            block,
            cells: [CellMeta::NO_DATA; CELL_COUNT],
        }
    }

    /// Serialize to the fixed on-disk layout.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        buf[4..6].copy_from_slice(&self.block.lat.to_le_bytes());
        buf[6..8].copy_from_slice(&self.block.lon.to_le_bytes());

        for (i, cell) in self.cells.iter().enumerate() {
            buf[8 + i] = cell.code;
            let at = 72 + i * 2;
            buf[at..at + 2].copy_from_slice(&cell.min.to_le_bytes());
            let at = 200 + i * 2;
            buf[at..at + 2].copy_from_slice(&cell.rows.to_le_bytes());
            let at = 328 + i * 2;
            buf[at..at + 2].copy_from_slice(&cell.cols.to_le_bytes());
            let at = 456 + i * 4;
            buf[at..at + 4].copy_from_slice(&cell.len.to_le_bytes());
            let at = 712 + i * 4;
            buf[at..at + 4].copy_from_slice(&cell.offset.to_le_bytes());
        }
        buf
    }

    /// Parse and validate a header from the start of a file's bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(TerrainError::CorruptHeader {
                reason: "file shorter than header",
            });
        }
        let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        if magic != MAGIC {
            return Err(TerrainError::CorruptHeader {
                reason: "bad magic",
            });
        }

        let block = BlockId::new(
            i16::from_le_bytes(bytes[4..6].try_into().unwrap()),
            i16::from_le_bytes(bytes[6..8].try_into().unwrap()),
        );
        if !block.is_valid() {
            return Err(TerrainError::CorruptHeader {
                reason: "block id out of range",
            });
        }

        let mut cells = [CellMeta::NO_DATA; CELL_COUNT];
        for (i, cell) in cells.iter_mut().enumerate() {
            let min = 72 + i * 2;
            let rows = 200 + i * 2;
            let cols = 328 + i * 2;
            let len = 456 + i * 4;
            let offset = 712 + i * 4;
            *cell = CellMeta {
                code: bytes[8 + i],
                min: i16::from_le_bytes(bytes[min..min + 2].try_into().unwrap()),
                rows: u16::from_le_bytes(bytes[rows..rows + 2].try_into().unwrap()),
                cols: u16::from_le_bytes(bytes[cols..cols + 2].try_into().unwrap()),
                len: u32::from_le_bytes(bytes[len..len + 4].try_into().unwrap()),
                offset: u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()),
            };
        }

        Ok(Self { block, cells })
    }
}
