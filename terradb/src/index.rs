//! Global block status index.
//!
//! One byte per possible 1° × 1° block worldwide, recording whether a
//! database file exists for it. The query engine consults this index before
//! opening a block file so it can fall back to a coarser data source
//! without paying for a failed open.
//!
//! The index is derived entirely from directory contents and rebuilt from
//! scratch after every conversion run; it carries no incremental state.

use std::fs;
use std::path::{Path, PathBuf};

use crate::block::{BlockId, BLOCK_COUNT, BLOCK_EXT};
use crate::error::Result;

/// Well-known index filename inside the database directory.
pub const INDEX_FILE: &str = "terradb.idx";

/// Index entry value for "no database file".
pub const STATUS_ABSENT: u8 = 0;

/// Index entry value for "database file exists".
pub const STATUS_PRESENT: u8 = 1;

/// Existence map over all [`BLOCK_COUNT`] blocks.
pub struct BlockIndex {
    slots: Vec<u8>,
}

impl BlockIndex {
    /// Index with every block marked absent.
    pub fn new() -> Self {
        Self {
            slots: vec![STATUS_ABSENT; BLOCK_COUNT],
        }
    }

    /// Rebuild the index from the database files currently in `db_dir`.
    ///
    /// Only entries with the block extension and a parseable, in-range
    /// block name are counted; anything else in the directory is skipped
    /// without comment (the directory legitimately holds the index file
    /// itself, and often stray files).
    pub fn rebuild(db_dir: &Path) -> Result<Self> {
        let mut index = Self::new();

        for entry in fs::read_dir(db_dir)?.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == BLOCK_EXT) != Some(true) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(block) = BlockId::parse(stem) {
                index.mark(block);
            }
        }

        Ok(index)
    }

    /// Mark a block as having a database file.
    pub fn mark(&mut self, block: BlockId) {
        self.slots[block.index_slot()] = STATUS_PRESENT;
    }

    /// Whether a database file exists for `block`.
    pub fn contains(&self, block: BlockId) -> bool {
        self.slots[block.index_slot()] == STATUS_PRESENT
    }

    /// Number of blocks marked present.
    pub fn block_count(&self) -> usize {
        self.slots.iter().filter(|&&s| s == STATUS_PRESENT).count()
    }

    /// The raw status byte array, in index-slot order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.slots
    }

    /// Write the index to its well-known file in `db_dir`, replacing any
    /// previous index. Returns the path written.
    pub fn write_to(&self, db_dir: &Path) -> Result<PathBuf> {
        let path = db_dir.join(INDEX_FILE);
        fs::write(&path, &self.slots)?;
        Ok(path)
    }
}

impl Default for BlockIndex {
    fn default() -> Self {
        Self::new()
    }
}
