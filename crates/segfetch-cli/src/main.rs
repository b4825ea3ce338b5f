use segfetch_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // File logging if the state dir is writable, otherwise stderr.
    if let Err(e) = logging::init_logging() {
        match logging::init_logging_stderr() {
            Ok(()) => tracing::warn!("file logging unavailable, using stderr: {:#}", e),
            Err(e2) => eprintln!("segfetch: logging disabled: {:#}; {:#}", e, e2),
        }
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("segfetch error: {:#}", err);
        std::process::exit(1);
    }
}
