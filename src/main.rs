//! gfakit CLI
//!
//! Reads, validates, converts and simplifies GFA1/GFA2 graphs.
//! Log verbosity follows `RUST_LOG` (default `warn`).

use gfakit::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
