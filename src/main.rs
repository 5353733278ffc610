//! Music Importer CLI
//!
//! Imports audio libraries into a local database, tracks which roots
//! were scanned, and supports re-importing them later.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use music_importer::{
    start_import, DirectorySelectionModel, HistoryDb, ImportConfig, ImportError, ImportSummary,
    ProgressReporter, WalkScanner,
};

const DEFAULT_DB: &str = "music_library.db";

/// Music library importer
#[derive(Parser)]
#[command(name = "music_importer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the import-running subcommands
#[derive(Args)]
struct ImportOpts {
    /// SQLite database file path
    #[arg(short = 'd', long, default_value = DEFAULT_DB)]
    db: PathBuf,

    /// Skip file hash computation (faster)
    #[arg(long)]
    no_hash: bool,

    /// Do not recurse into subdirectories
    #[arg(long)]
    no_recursive: bool,

    /// Maximum depth for recursive scanning
    #[arg(long, default_value = "8")]
    max_depth: usize,

    /// Emit JSON progress messages on stderr
    #[arg(long)]
    progress: bool,

    /// Output the final summary as JSON
    #[arg(long)]
    json: bool,
}

impl ImportOpts {
    fn config(&self) -> ImportConfig {
        ImportConfig::builder()
            .compute_hash(!self.no_hash)
            .recursive(!self.no_recursive)
            .max_depth(self.max_depth)
            .db_path(self.db.clone())
            .build()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Import audio files from one or more root directories
    Scan {
        /// Root directories to import (repeatable)
        #[arg(short = 'r', long = "root", required = true)]
        roots: Vec<PathBuf>,

        #[command(flatten)]
        opts: ImportOpts,
    },
    /// Re-import previously scanned root directories
    Rescan {
        /// Re-import every known root (without this, roots are listed only)
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        opts: ImportOpts,
    },
    /// List previously scanned root directories
    Roots {
        /// SQLite database file path
        #[arg(short = 'd', long, default_value = DEFAULT_DB)]
        db: PathBuf,
    },
    /// Delete all imported records and the scan history
    Clear {
        /// SQLite database file path
        #[arg(short = 'd', long, default_value = DEFAULT_DB)]
        db: PathBuf,

        /// Confirm the deletion (refused without this)
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan { roots, opts } => run_import_command(roots, &opts),
        Commands::Rescan { all, opts } => rescan(all, &opts),
        Commands::Roots { db } => list_roots(&db),
        Commands::Clear { db, yes } => clear(&db, yes),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Run one import over the given roots and print the summary
fn run_import_command(roots: Vec<PathBuf>, opts: &ImportOpts) -> Result<(), ImportError> {
    let config = opts.config();
    let store = HistoryDb::open(&opts.db)?;
    let scanner = WalkScanner::new(config.clone());

    info!("importing {} directories into {:?}", roots.len(), opts.db);

    let handle = start_import(scanner, store, roots);
    let reporter = ProgressReporter::new(opts.progress, config.progress_interval_ms);
    for event in handle.events.iter() {
        reporter.report(&event);
    }
    let summary = handle.join();

    print_summary(&summary, opts.json);
    Ok(())
}

/// Re-import previously scanned roots, or list them when --all is absent
fn rescan(all: bool, opts: &ImportOpts) -> Result<(), ImportError> {
    let db = HistoryDb::open(&opts.db)?;
    let mut model = DirectorySelectionModel::new();
    model.refresh(&db)?;
    drop(db);

    if model.is_empty() {
        println!("No previously scanned directories.");
        return Ok(());
    }

    if !all {
        print_entries(&model);
        println!("\nRun with --all to re-import all of them.");
        return Ok(());
    }

    model.toggle_all(true);
    let roots = model.selected_paths();
    run_import_command(roots, opts)
}

/// Print the scan history table
fn list_roots(db_path: &PathBuf) -> Result<(), ImportError> {
    let db = HistoryDb::open(db_path)?;
    let mut model = DirectorySelectionModel::new();
    model.refresh(&db)?;

    if model.is_empty() {
        println!("No previously scanned directories.");
    } else {
        print_entries(&model);
    }
    Ok(())
}

/// Delete all records and scan history; requires --yes
fn clear(db_path: &PathBuf, yes: bool) -> Result<(), ImportError> {
    if !yes {
        eprintln!("This deletes all imported records and the scan history.");
        eprintln!("Re-run with --yes to confirm.");
        std::process::exit(2);
    }

    let mut db = HistoryDb::open(db_path)?;
    let records = db.record_count()?;
    let mut model = DirectorySelectionModel::new();
    model.clear_all(&mut db)?;

    println!("Cleared {} records and the scan history.", records);
    Ok(())
}

fn print_entries(model: &DirectorySelectionModel) {
    println!("{:<50} {:<20} {}", "path", "last scanned", "status");
    for entry in model.entries() {
        println!(
            "{:<50} {:<20} {}",
            entry.path, entry.last_scanned, entry.status
        );
    }
}

fn print_summary(summary: &ImportSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(out) => println!("{}", out),
            Err(e) => log::error!("failed to serialize summary: {}", e),
        }
        return;
    }

    if summary.cancelled {
        println!("Import cancelled:");
    } else {
        println!("Import completed:");
    }
    println!("  Directories processed: {}", summary.directories_processed);
    println!("  Directories failed: {}", summary.directories_failed);
    println!("  Records imported: {}", summary.records_imported);
    println!("  Records failed: {}", summary.records_failed);
    println!("  Duration: {}ms", summary.duration_ms);
}
