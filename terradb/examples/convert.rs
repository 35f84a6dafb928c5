//! Basic example converting one survey pair into a database block.
//!
//! Run with: cargo run --example convert -- /surveys/n35w123.flt /data/terrain

use std::path::PathBuf;

use terradb::{Converter, WriteOutcome};

fn main() -> Result<(), terradb::TerrainError> {
    let mut args = std::env::args().skip(1);
    let (Some(survey), Some(db_dir)) = (args.next(), args.next()) else {
        eprintln!("Usage: cargo run --example convert -- <survey.flt> <db-dir>");
        std::process::exit(1);
    };

    std::fs::create_dir_all(&db_dir)?;
    let mut converter = Converter::new(&db_dir);

    let outcome = converter.convert_file(&PathBuf::from(&survey))?;
    match outcome.outcome {
        WriteOutcome::WroteData { no_data_cells } => {
            println!(
                "{}: wrote {} ({} no-data cells, {} samples infilled)",
                outcome.block,
                outcome.block.filename(),
                no_data_cells,
                outcome.infilled
            );
        }
        WriteOutcome::AllZero => {
            println!("{}: all sea level, no file needed", outcome.block);
        }
        WriteOutcome::Missing => {
            println!("{}: no usable data", outcome.block);
        }
    }

    Ok(())
}
