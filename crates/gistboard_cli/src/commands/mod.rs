//! CLI command implementations.

pub mod interactive;
pub mod oneshot;

use crate::console::Console;
use gistboard_engine::{Board, BoardError, DocumentTransport};
use std::io::{self, Write};

/// An operation on the board, shared by the prompt and the subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    /// Print every entry.
    Show,
    /// Print the entry count against the ceiling.
    Count,
    /// Clear the board.
    Reset,
    /// List the prompt commands.
    Help,
    /// Append a message.
    Post(String),
}

/// Runs one command and reports the result on the console.
///
/// Board failures are reported as console lines, not returned; only
/// console write errors escape.
pub fn execute<T, W>(
    board: &Board<T>,
    console: &Console<W>,
    command: &BoardCommand,
) -> io::Result<()>
where
    T: DocumentTransport,
    W: Write,
{
    match command {
        BoardCommand::Show => match board.entries() {
            Ok(entries) => console.lines(entries),
            Err(_) => console.line("Cannot refresh board (offline)"),
        },
        BoardCommand::Count => match board.count() {
            Ok(count) => console.line(format_args!("Messages: {}/{}", count, board.ceiling())),
            Err(_) => console.line("Cannot get message count (offline)"),
        },
        BoardCommand::Reset => {
            console.line("Clearing all messages...")?;
            match board.reset_board() {
                Ok(()) => console.line("Board cleared!"),
                Err(_) => console.line("Failed to clear board."),
            }
        }
        BoardCommand::Help => console.lines([
            "Commands:",
            "  clear - Refresh display",
            "  count - Show message count",
            "  reset - Clear all messages from board",
            "  help - Show this help",
            "  quit - Exit application",
        ]),
        BoardCommand::Post(message) => post(board, console, message),
    }
}

fn post<T, W>(board: &Board<T>, console: &Console<W>, message: &str) -> io::Result<()>
where
    T: DocumentTransport,
    W: Write,
{
    console.clear_input_line()?;
    let limit_notice = format!("Message limit reached ({}). Auto-clearing...", board.ceiling());

    match board.append_message(message) {
        Ok(outcome) if outcome.truncated => {
            console.lines([limit_notice.as_str(), "Board cleared. Starting fresh!"])
        }
        Ok(_) => Ok(()),
        Err(BoardError::MessageTooLong { max, .. }) => {
            console.line(format_args!("Message too long (max {} chars)", max))
        }
        Err(BoardError::EmptyMessage) => console.line("Message is empty"),
        Err(BoardError::MultilineMessage) => console.line("Message must be a single line"),
        Err(BoardError::Offline(_)) => {
            console.line("Connection failed. Working offline until reconnected.")
        }
        Err(BoardError::TruncateFailed(_)) => {
            console.lines([limit_notice.as_str(), "Failed to clear board."])
        }
        Err(BoardError::WriteFailed(_)) => {
            console.line("Failed to send message. Please try again.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gistboard_engine::{BoardConfig, MemoryTransport, RetryConfig};
    use std::sync::Arc;
    use std::time::Duration;

    fn board(content: &str) -> (Board<Arc<MemoryTransport>>, Arc<MemoryTransport>) {
        let config = BoardConfig::new("gist", "token")
            .with_retry(RetryConfig::no_retry())
            .with_cache_ttl(Duration::ZERO)
            .with_min_request_interval(Duration::ZERO);
        let transport = Arc::new(MemoryTransport::with_content(content));
        let (board, _engine) = Board::open(&config, Arc::clone(&transport));
        (board, transport)
    }

    fn run(board: &Board<Arc<MemoryTransport>>, command: BoardCommand) -> String {
        let console = Console::new(Vec::new(), false);
        execute(board, &console, &command).unwrap();
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn show_and_count() {
        let (board, _transport) = board("a\n\nb");
        assert_eq!(run(&board, BoardCommand::Show), ">>a\n>>b\n");
        assert_eq!(run(&board, BoardCommand::Count), ">>Messages: 2/45\n");
    }

    #[test]
    fn count_while_offline() {
        let (board, transport) = board("a");
        transport.set_connected(false);
        assert_eq!(
            run(&board, BoardCommand::Count),
            ">>Cannot get message count (offline)\n"
        );
    }

    #[test]
    fn reset_reports_success_and_failure() {
        let (board, transport) = board("a");
        assert_eq!(
            run(&board, BoardCommand::Reset),
            ">>Clearing all messages...\n>>Board cleared!\n"
        );
        assert_eq!(transport.content(), "");

        transport.set_connected(false);
        assert_eq!(
            run(&board, BoardCommand::Reset),
            ">>Clearing all messages...\n>>Failed to clear board.\n"
        );
    }

    #[test]
    fn post_is_silent_on_success() {
        let (board, transport) = board("a");
        assert_eq!(run(&board, BoardCommand::Post("b".into())), "");
        assert_eq!(transport.content(), "a\nb");
    }

    #[test]
    fn post_reports_truncation() {
        let full: Vec<String> = (0..45).map(|i| i.to_string()).collect();
        let (board, transport) = board(&full.join("\n"));

        assert_eq!(
            run(&board, BoardCommand::Post("x".into())),
            ">>Message limit reached (45). Auto-clearing...\n>>Board cleared. Starting fresh!\n"
        );
        assert_eq!(transport.content(), "x");
    }

    #[test]
    fn post_reports_empty_message() {
        let (board, transport) = board("a");
        assert_eq!(
            run(&board, BoardCommand::Post("   ".into())),
            ">>Message is empty\n"
        );
        assert_eq!(transport.read_count(), 0);
    }

    #[test]
    fn post_rejects_long_message_locally() {
        let (board, transport) = board("a");
        assert_eq!(
            run(&board, BoardCommand::Post("y".repeat(51))),
            ">>Message too long (max 50 chars)\n"
        );
        assert_eq!(transport.read_count(), 0);
    }

    #[test]
    fn post_reports_write_failure() {
        let (board, transport) = board("a");
        transport.fail_next_writes(1);
        assert_eq!(
            run(&board, BoardCommand::Post("b".into())),
            ">>Failed to send message. Please try again.\n"
        );
    }
}
