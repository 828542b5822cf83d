//! catalogdb terminal menu.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

use catalogdb::{logging, RecordStore, StoreConfig};

mod menu;

use menu::Menu;

/// Manage a book catalog stored in a fixed-slot binary file.
#[derive(Debug, Parser)]
#[command(name = "catalogdb", version, about)]
struct Args {
    /// Data file; temp, backup and sequence files are created next to it.
    #[arg(short, long, default_value = "books.dat")]
    data: PathBuf,

    /// Log level for stderr (overridden by RUST_LOG).
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(args.log_level) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let mut store = match RecordStore::open(StoreConfig::new(&args.data)) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, path = %args.data.display(), "failed to open catalog");
            eprintln!("Error: Unable to create or open database file {}!", args.data.display());
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    match Menu::new(&mut store, stdin.lock(), stdout.lock()).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "aborting session");
            eprintln!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}
