//! Single board operations run from the command line.

use super::{execute, BoardCommand};
use crate::console::Console;
use gistboard_engine::{Board, BoardConfig, GistTransport};
use std::process;
use tracing::{debug, warn};

/// Runs one command against the board and returns.
pub fn run(
    config: &BoardConfig,
    command: &BoardCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    // An interrupted command leaves quietly with status 0.
    if let Err(err) = ctrlc::set_handler(|| process::exit(0)) {
        warn!(error = %err, "failed to set Ctrl-C handler");
    }

    let (board, _engine) = Board::open(config, GistTransport::connect(config));
    let console = Console::stdout(false);

    execute(&board, &console, command)?;

    debug!(stats = ?board.store().stats(), "request stats");
    Ok(())
}
