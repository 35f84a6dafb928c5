use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use terradb::block::{BlockId, BLOCK_COUNT};
use terradb::index::INDEX_FILE;

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

    // Collect .trn files
    let mut blocks: Vec<_> = fs::read_dir(&dir)
        .context("Failed to read database directory")?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|e| e == "trn")
                .unwrap_or(false)
        })
        .collect();

    if blocks.is_empty() {
        println!("No .trn files found in: {}", dir.display());
        return Ok(());
    }

    // Sort by filename
    blocks.sort_by_key(|e| e.file_name());

    let mut total_size: u64 = 0;
    let mut unknown_count = 0;

    println!("{:<14} {:>10} {:>12}", "FILE", "BLOCK", "SIZE");
    println!("{}", "-".repeat(38));

    for entry in &blocks {
        let filename = entry.file_name();
        let filename_str = filename.to_string_lossy();

        let size = fs::metadata(entry.path()).map(|m| m.len()).unwrap_or(0);
        total_size += size;

        let block = match BlockId::parse(&filename_str) {
            Some(block) => block.to_string(),
            None => {
                unknown_count += 1;
                "???".to_string()
            }
        };

        println!("{:<14} {:>10} {:>12}", filename_str, block, format_size(size));
    }

    // Summary
    println!();
    println!("Summary:");
    println!("  Total blocks: {}", blocks.len());
    if unknown_count > 0 {
        println!("  Unrecognized names: {}", unknown_count);
    }
    println!("  Total size: {}", format_size(total_size));

    let index_path = dir.join(INDEX_FILE);
    match fs::metadata(&index_path) {
        Ok(m) if m.len() == BLOCK_COUNT as u64 => {
            println!("  Status index: present");
        }
        Ok(m) => {
            println!(
                "  Status index: unexpected size ({} bytes, want {})",
                m.len(),
                BLOCK_COUNT
            );
        }
        Err(_) => {
            println!("  Status index: missing (run `terradb index`)");
        }
    }
    println!("  Database directory: {}", dir.display());

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
