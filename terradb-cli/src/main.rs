use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Terrain database build tool
#[derive(Parser)]
#[command(name = "terradb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database directory
    #[arg(short, long, env = "TERRADB_DATA_DIR", global = true)]
    db_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert survey files into database blocks
    Convert {
        /// Survey .flt files, or directories to scan for them
        inputs: Vec<PathBuf>,

        /// Zero-sample count above which coastal infill engages
        #[arg(long)]
        zero_threshold: Option<u32>,

        /// Continue without a progress bar (for non-interactive runs)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Rebuild the block status index from the database directory
    Index,

    /// Display information about a database block file
    Info {
        /// Path to a .trn file, or a block name (e.g., n35w123)
        block: String,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List database blocks
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            inputs,
            zero_threshold,
            quiet,
        } => commands::convert::run(cli.db_dir, inputs, zero_threshold, quiet),
        Commands::Index => commands::index::run(cli.db_dir),
        Commands::Info { block, json } => commands::info::run(cli.db_dir, block, json),
        Commands::List => commands::list::run(cli.db_dir),
    }
}
