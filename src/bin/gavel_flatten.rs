//! gavel-flatten: Flatten auction dump files into pipe-delimited load files
//!
//! Usage:
//!   # Flatten one dump into ./items.dat, ./users.dat, ./bids.dat, ./categories.dat
//!   gavel-flatten items-0.json
//!
//!   # A whole directory of dumps, rows appended file by file
//!   gavel-flatten --append -o ./load ebay/*.json
//!
//!   # One users row per distinct UserID, run summary on stdout
//!   gavel-flatten --dedup-users --stats ebay/*.json

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use gavel::flatten::{ExtractWriter, FlattenConfig, FlushPolicy, RowCounts};
use log::{debug, error, info};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gavel-flatten")]
#[command(about = "Flatten auction dump files into pipe-delimited load files", long_about = None)]
struct Args {
    /// Input dump files; paths without a .json extension are skipped
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Directory for the four .dat output files
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,

    /// Write each file's rows as it completes instead of buffering the run
    #[arg(long)]
    append: bool,

    /// Stop at the first file that cannot be loaded
    #[arg(long)]
    fail_fast: bool,

    /// Pass unrecognized month abbreviations through instead of skipping the item
    #[arg(long)]
    lenient_dates: bool,

    /// Keep one users row per UserID, the last observation winning
    #[arg(long, conflicts_with = "append")]
    dedup_users: bool,

    /// Print a JSON run summary to stdout
    #[arg(long)]
    stats: bool,
}

/// Summary printed by `--stats`.
#[derive(Serialize)]
struct RunStats {
    files_parsed: usize,
    files_failed: usize,
    items_skipped: usize,
    rows: RowCounts,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let policy = if args.append {
        FlushPolicy::PerDocument
    } else {
        FlushPolicy::Buffered
    };
    let config = FlattenConfig {
        lenient_dates: args.lenient_dates,
    };

    let mut writer = ExtractWriter::create(&args.output_dir, policy, args.dedup_users)?;

    let mut files_parsed = 0usize;
    let mut files_failed = 0usize;
    let mut items_skipped = 0usize;

    for path in &args.files {
        if !gavel::has_json_ext(path) {
            debug!("skipping {} (not a .json file)", path.display());
            continue;
        }

        match gavel::flatten_path(path, config) {
            Ok(document) => {
                items_skipped += document.skipped.len();
                info!(
                    "parsed {} items from {}",
                    document.rows.items.len(),
                    path.display()
                );
                writer.write_document(document.rows)?;
                files_parsed += 1;
            }
            Err(err) => {
                if args.fail_fast {
                    return Err(err.into());
                }
                error!("{err}");
                files_failed += 1;
            }
        }
    }

    let rows = writer.finish()?;

    if args.stats {
        let stats = RunStats {
            files_parsed,
            files_failed,
            items_skipped,
            rows,
        };
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    if files_failed > 0 {
        anyhow::bail!("{files_failed} input file(s) failed");
    }
    Ok(())
}
