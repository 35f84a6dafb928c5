use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use terradb::cell::CELL_SAMPLES;
use terradb::codec;
use terradb::format::{FileHeader, CODE_CONSTANT, CODE_RAW, HEADER_LEN};

#[derive(Serialize)]
struct BlockReport {
    block: String,
    path: String,
    file_size: u64,
    data_cells: usize,
    no_data_cells: usize,
    constant_cells: usize,
    min_elevation: Option<i16>,
    max_elevation: Option<i16>,
}

pub fn run(db_dir: Option<PathBuf>, block: String, json: bool) -> Result<()> {
    // Determine the file to inspect
    let path = if block.ends_with(".trn") {
        PathBuf::from(&block)
    } else {
        let dir = match db_dir {
            Some(dir) => dir,
            None => {
                let dir = std::env::var("TERRADB_DATA_DIR").context(
                    "TERRADB_DATA_DIR environment variable not set. Use --db-dir or set TERRADB_DATA_DIR",
                )?;
                PathBuf::from(dir)
            }
        };
        dir.join(format!("{}.trn", block.to_lowercase()))
    };

    if !path.exists() {
        bail!("Block file not found: {}", path.display());
    }

    let bytes = std::fs::read(&path).context("Failed to read block file")?;
    let header = FileHeader::decode(&bytes).context("Failed to parse block header")?;

    let mut data_cells = 0usize;
    let mut no_data_cells = 0usize;
    let mut constant_cells = 0usize;
    let mut min_elev: Option<i16> = None;
    let mut max_elev: Option<i16> = None;
    let mut samples = Vec::with_capacity(CELL_SAMPLES);

    for meta in &header.cells {
        if !meta.has_data() {
            no_data_cells += 1;
            continue;
        }
        data_cells += 1;
        if meta.code == CODE_CONSTANT {
            constant_cells += 1;
        }

        let count = meta.rows as usize * meta.cols as usize;
        let cell_max = match meta.code {
            CODE_CONSTANT => meta.min,
            CODE_RAW => {
                let record = record_bytes(&bytes, meta.offset, meta.len)?;
                record
                    .chunks_exact(2)
                    .map(|b| i16::from_le_bytes([b[0], b[1]]))
                    .max()
                    .unwrap_or(meta.min)
            }
            width if width <= codec::MAX_BIT_WIDTH => {
                let record = record_bytes(&bytes, meta.offset, meta.len)?;
                codec::unpack(record, meta.min, width, count, &mut samples)
                    .context("Failed to unpack cell record")?;
                samples.iter().copied().max().unwrap_or(meta.min)
            }
            code => bail!("Unknown compression code {code} in {}", path.display()),
        };

        min_elev = Some(min_elev.map_or(meta.min, |m| m.min(meta.min)));
        max_elev = Some(max_elev.map_or(cell_max, |m| m.max(cell_max)));
    }

    let report = BlockReport {
        block: header.block.to_string(),
        path: path.display().to_string(),
        file_size: bytes.len() as u64,
        data_cells,
        no_data_cells,
        constant_cells,
        min_elevation: min_elev,
        max_elevation: max_elev,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Block: {}", report.block);
    println!("Path: {}", report.path);
    println!();
    println!(
        "File size: {} ({} header + {} record bytes)",
        report.file_size,
        HEADER_LEN,
        report.file_size as usize - HEADER_LEN
    );
    println!("Cells with data: {}/64", report.data_cells);
    if report.constant_cells > 0 {
        println!("  Constant cells: {}", report.constant_cells);
    }
    if report.no_data_cells > 0 {
        println!("  No-data cells: {}", report.no_data_cells);
    }
    if let (Some(min), Some(max)) = (report.min_elevation, report.max_elevation) {
        println!();
        println!("Min elevation: {}m", min);
        println!("Max elevation: {}m", max);
    }

    Ok(())
}

fn record_bytes(bytes: &[u8], offset: u32, len: u32) -> Result<&[u8]> {
    bytes
        .get(offset as usize..(offset + len) as usize)
        .context("Cell record extends past end of file")
}
