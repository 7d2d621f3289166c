//! Gistboard CLI
//!
//! A terminal message board shared through a single gist file.
//!
//! # Commands
//!
//! - (none) - Run the interactive board
//! - `post` - Append one message
//! - `count` - Show the message count
//! - `reset` - Clear the board
//! - `show` - Print every message

mod commands;
mod console;

use clap::{Parser, Subcommand};
use commands::BoardCommand;
use gistboard_engine::{BoardConfig, DEFAULT_API_BASE, DEFAULT_FILENAME};
use tracing_subscriber::EnvFilter;

/// Terminal message board backed by a gist.
#[derive(Parser)]
#[command(name = "gistboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Id of the gist holding the board
    #[arg(global = true, short, long)]
    gist_id: Option<String>,

    /// API token sent as a bearer token
    #[arg(global = true, short, long)]
    token: Option<String>,

    /// File inside the gist holding the board
    #[arg(global = true, short, long, default_value = DEFAULT_FILENAME)]
    filename: String,

    /// Base URL of the gist API
    #[arg(global = true, long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Append a message to the board
    Post {
        /// Message text, at most 50 characters
        message: String,
    },

    /// Show the message count
    Count,

    /// Clear all messages from the board
    Reset,

    /// Print every message on the board
    Show,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help, version and usage errors all exit with status 0.
            let _ = e.print();
            return;
        }
    };

    // Logs go to stderr. Without --verbose only errors are shown.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_directive(cli.verbose)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        println!(">>Fatal error: {}", e);
    }
}

fn log_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "error"
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let gist_id = cli.gist_id.ok_or("Gist id required (--gist-id)")?;
    let config = BoardConfig::new(gist_id, cli.token.unwrap_or_default())
        .with_filename(cli.filename)
        .with_api_base(cli.api_base);
    tracing::debug!(?config, "starting");

    let command = match cli.command {
        None => return commands::interactive::run(&config),
        Some(Commands::Post { message }) => BoardCommand::Post(message),
        Some(Commands::Count) => BoardCommand::Count,
        Some(Commands::Reset) => BoardCommand::Reset,
        Some(Commands::Show) => BoardCommand::Show,
    };
    commands::oneshot::run(&config, &command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn retries_only_show_when_verbose() {
        assert_eq!(log_directive(false), "error");
        assert_eq!(log_directive(true), "debug");
    }

    #[test]
    fn bad_arguments_are_errors_not_exits() {
        let err = Cli::try_parse_from(["gistboard", "--bogus"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);

        let err = Cli::try_parse_from(["gistboard", "--gist-id"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn subcommands_share_global_flags() {
        let cli = Cli::try_parse_from(["gistboard", "post", "hi", "--gist-id", "abc"]).unwrap();
        assert_eq!(cli.gist_id.as_deref(), Some("abc"));
        assert_eq!(cli.filename, DEFAULT_FILENAME);
        assert!(matches!(cli.command, Some(Commands::Post { message }) if message == "hi"));

        let cli = Cli::try_parse_from(["gistboard", "-g", "abc"]).unwrap();
        assert!(cli.command.is_none());
    }
}
