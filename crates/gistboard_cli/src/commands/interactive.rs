//! Interactive board: live feed plus a prompt.

use super::{execute, BoardCommand};
use crate::console::Console;
use gistboard_engine::{codec, Board, BoardConfig, GistTransport, PollOutcome, Shutdown};
use std::io::{self, BufRead, IsTerminal, Write};
use std::process;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// One line of prompt input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    /// Nothing but whitespace.
    Empty,
    /// `quit`, `exit` or `q`.
    Quit,
    /// A board command or a message to post.
    Command(BoardCommand),
}

impl ReplInput {
    /// Parses a prompt line. Command words are case-insensitive; anything
    /// else is a message.
    pub fn parse(line: &str) -> Self {
        let input = line.trim();
        if input.is_empty() {
            return Self::Empty;
        }
        match input.to_lowercase().as_str() {
            "clear" => Self::Command(BoardCommand::Show),
            "count" => Self::Command(BoardCommand::Count),
            "reset" => Self::Command(BoardCommand::Reset),
            "help" => Self::Command(BoardCommand::Help),
            "quit" | "exit" | "q" => Self::Quit,
            _ => Self::Command(BoardCommand::Post(input.to_string())),
        }
    }
}

/// Runs the interactive board until quit, end of input or Ctrl-C.
pub fn run(config: &BoardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let console = Arc::new(Console::stdout(io::stdout().is_terminal()));
    let (board, mut engine) = Board::open(config, GistTransport::connect(config));
    let events = engine.subscribe();

    let shutdown = Arc::new(Shutdown::new());
    let interrupted = (Arc::clone(&console), Arc::clone(&shutdown));
    if let Err(err) = ctrlc::set_handler(move || {
        let (console, shutdown) = &interrupted;
        let _ = farewell(&**console, shutdown);
        process::exit(0);
    }) {
        warn!(error = %err, "failed to set Ctrl-C handler");
    }

    console.line("Connecting...")?;
    let first = engine.poll_once();
    if let PollOutcome::Failed(err) = &first {
        debug!(error = %err, "initial load failed");
        for event in events.try_iter() {
            console.event(&event)?;
        }
        console.line("Working offline. Messages will sync when reconnected.")?;
    } else {
        console.line("Connected!")?;
        for event in events.try_iter() {
            console.event(&event)?;
        }
        let count = codec::count_entries(engine.last_seen().unwrap_or_default());
        if count > 0 {
            console.line(format_args!("Messages: {}/{}", count, board.ceiling()))?;
        }
    }

    let printer = Arc::clone(&console);
    thread::Builder::new()
        .name("gistboard-printer".into())
        .spawn(move || {
            for event in events {
                if printer.notify(&event).is_err() {
                    break;
                }
            }
        })?;

    engine.spawn(Arc::clone(&shutdown))?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        console.prompt()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match ReplInput::parse(&line) {
            ReplInput::Empty => continue,
            ReplInput::Quit => break,
            ReplInput::Command(command) => execute(&board, &*console, &command)?,
        }
    }

    farewell(&*console, &shutdown)?;
    debug!(stats = ?board.store().stats(), "session finished");
    Ok(())
}

/// Stops the sync loop and says goodbye. Used on quit, end of input and
/// Ctrl-C.
fn farewell<W: Write>(console: &Console<W>, shutdown: &Shutdown) -> io::Result<()> {
    // The sync thread wakes on the signal; nothing waits for it.
    shutdown.trigger();
    console.clear_input_line()?;
    console.line("Goodbye!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(
            ReplInput::parse("CLEAR\n"),
            ReplInput::Command(BoardCommand::Show)
        );
        assert_eq!(
            ReplInput::parse(" Count "),
            ReplInput::Command(BoardCommand::Count)
        );
        assert_eq!(
            ReplInput::parse("reset"),
            ReplInput::Command(BoardCommand::Reset)
        );
        assert_eq!(
            ReplInput::parse("Help"),
            ReplInput::Command(BoardCommand::Help)
        );
    }

    #[test]
    fn farewell_stops_sync_and_says_goodbye() {
        let console = Console::new(Vec::new(), true);
        let shutdown = Shutdown::new();

        farewell(&console, &shutdown).unwrap();

        assert!(shutdown.is_triggered());
        assert_eq!(
            String::from_utf8(console.into_inner()).unwrap(),
            "\r\x1b[K>>Goodbye!\n"
        );
    }

    #[test]
    fn quit_words() {
        for word in ["quit", "EXIT", "q", "Q\r\n"] {
            assert_eq!(ReplInput::parse(word), ReplInput::Quit);
        }
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(ReplInput::parse(""), ReplInput::Empty);
        assert_eq!(ReplInput::parse("   \n"), ReplInput::Empty);
    }

    #[test]
    fn everything_else_is_a_message() {
        assert_eq!(
            ReplInput::parse("  hello there \n"),
            ReplInput::Command(BoardCommand::Post("hello there".into()))
        );
        assert_eq!(
            ReplInput::parse("quit now"),
            ReplInput::Command(BoardCommand::Post("quit now".into()))
        );
    }
}
