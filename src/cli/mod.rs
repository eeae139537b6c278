//! CLI for blocksmith
//!
//! One-shot commands for browsing and tree processing, plus a serving
//! loop that reads one request envelope per stdin line.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::run_command;
pub use errors::{CliError, CliResult};

/// Parse arguments and run the selected command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli)
}
