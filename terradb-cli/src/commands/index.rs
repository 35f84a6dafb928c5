use anyhow::{Context, Result};
use std::path::PathBuf;

use terradb::index::{BlockIndex, INDEX_FILE};

pub fn run(db_dir: Option<PathBuf>) -> Result<()> {
    let dir = match db_dir {
        Some(dir) => dir,
        None => {
            let dir = std::env::var("TERRADB_DATA_DIR").context(
                "TERRADB_DATA_DIR environment variable not set. Use --db-dir or set TERRADB_DATA_DIR",
            )?;
            PathBuf::from(dir)
        }
    };

    if !dir.exists() {
        anyhow::bail!("Database directory does not exist: {}", dir.display());
    }

    let index = BlockIndex::rebuild(&dir).context("Failed to scan database directory")?;
    let path = index
        .write_to(&dir)
        .with_context(|| format!("Failed to write {}", dir.join(INDEX_FILE).display()))?;

    println!("Status index rebuilt: {}", path.display());
    println!("  Blocks present: {}", index.block_count());

    Ok(())
}
