//! Standalone CLI tool moving files to the trash / Recycle Bin.

use std::path::PathBuf;

use clap::Parser;

use shellkit_cli::logging;
use shellkit_core::trash::{remove_to_trash, RemoveOptions};

#[derive(Parser)]
#[command(name = "shellkit-trash", about = "Move files to the recoverable trash location")]
struct Args {
    /// Files or directories to trash
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Let the shell ask for confirmation
    #[arg(long)]
    confirm: bool,

    /// Show the shell's progress dialog
    #[arg(long)]
    progress: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let options = RemoveOptions {
        confirm: args.confirm,
        show_progress: args.progress,
    };

    let mut failed = false;
    for path in &args.paths {
        if let Err(e) = remove_to_trash(path, options) {
            eprintln!("shellkit-trash: {}: {e}", path.display());
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }
}
