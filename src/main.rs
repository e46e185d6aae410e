//! Game Marketplace CLI
//!
//! Interactive console front end over the flat-file marketplace stores.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.txt inventory.txt ownership.txt daily.txt
//! ```
//!
//! The program opens the three record stores and the daily transaction log
//! at the given paths (creating files as needed on first mutation), then
//! reads commands from stdin until `exit` or end of input. Diagnostics go
//! to stderr; command output goes to stdout.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments or an unrecoverable I/O failure)

use game_marketplace::{cli, Marketplace};
use std::io;
use std::process;

fn main() {
    // Diagnostics (skipped-line warnings and the like) go to stderr so they
    // never interleave with command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = cli::parse_args();

    let mut market = Marketplace::open(
        &args.accounts_file,
        &args.inventory_file,
        &args.ownership_file,
        &args.log_file,
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(e) = cli::run(&mut market, stdin.lock(), &mut stdout) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
