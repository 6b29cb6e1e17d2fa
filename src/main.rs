// Custodian — Application Entry Point
//
// Parses CLI arguments, initializes structured logging on stderr (stdout is
// reserved for the released key), and dispatches to the command handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use custodian::cli::{execute, Cli};

fn main() {
    // RUST_LOG=custodian=debug for verbose output. No level ever logs the
    // PIN, the derived key or the vault key.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("custodian=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
