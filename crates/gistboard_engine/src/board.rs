//! Board controller: validated appends, forced truncation and reset.

use crate::codec;
use crate::config::BoardConfig;
use crate::echo::EchoSuppressor;
use crate::engine::SyncEngine;
use crate::error::{BoardError, BoardResult, StoreResult};
use crate::policy::TruncationPolicy;
use crate::store::DocumentStore;
use crate::transport::DocumentTransport;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Whether the board was cleared before the append.
    pub truncated: bool,
    /// Entries on the board after the append.
    pub entry_count: usize,
}

/// User-facing operations on the shared board.
///
/// Shares its store and echo flag with the [`SyncEngine`] created
/// alongside it by [`Board::open`].
pub struct Board<T: DocumentTransport> {
    store: Arc<DocumentStore<T>>,
    echo: Arc<EchoSuppressor>,
    policy: TruncationPolicy,
    max_entry_len: usize,
}

impl<T: DocumentTransport> Board<T> {
    /// Opens a board over `transport` along with its sync engine.
    pub fn open(config: &BoardConfig, transport: T) -> (Self, SyncEngine<T>) {
        let store = Arc::new(DocumentStore::new(config, transport));
        let echo = Arc::new(EchoSuppressor::new());
        let engine = SyncEngine::new(config, Arc::clone(&store), Arc::clone(&echo));
        let board = Self {
            store,
            echo,
            policy: TruncationPolicy::new(config.ceiling),
            max_entry_len: config.max_entry_len,
        };
        (board, engine)
    }

    /// Returns the shared store.
    pub fn store(&self) -> &Arc<DocumentStore<T>> {
        &self.store
    }

    /// Returns the truncation ceiling.
    pub fn ceiling(&self) -> usize {
        self.policy.ceiling()
    }

    /// Returns the maximum message length in characters.
    pub fn max_entry_len(&self) -> usize {
        self.max_entry_len
    }

    /// Checks a message before anything is sent.
    pub fn validate(&self, message: &str) -> BoardResult<()> {
        if codec::is_blank(message) {
            return Err(BoardError::EmptyMessage);
        }
        if message.contains(['\n', '\r']) {
            return Err(BoardError::MultilineMessage);
        }
        let len = message.chars().count();
        if len > self.max_entry_len {
            return Err(BoardError::MessageTooLong {
                len,
                max: self.max_entry_len,
            });
        }
        Ok(())
    }

    /// Appends a message to the board.
    ///
    /// Clears the board first when it already holds `ceiling` entries.
    /// The next poll cycle skips the appended line instead of echoing it.
    pub fn append_message(&self, message: &str) -> BoardResult<AppendOutcome> {
        self.validate(message)?;

        let content = self.store.fetch().map_err(BoardError::Offline)?;
        let count = codec::count_entries(&content);

        let (base, truncated) = if self.policy.should_truncate(count) {
            info!(count, ceiling = self.policy.ceiling(), "board full, clearing");
            self.store.update("").map_err(BoardError::TruncateFailed)?;
            (String::new(), true)
        } else {
            (content, false)
        };

        let updated = codec::append(&base, message);
        {
            let mut echo = self.echo.lock();
            self.store.update(&updated).map_err(|err| {
                warn!(error = %err, "append failed");
                BoardError::WriteFailed(err)
            })?;
            echo.arm();
        }

        let entry_count = codec::count_entries(&updated);
        debug!(entry_count, truncated, "message appended");
        Ok(AppendOutcome {
            truncated,
            entry_count,
        })
    }

    /// Clears the board. Leaves the echo flag alone.
    pub fn reset_board(&self) -> StoreResult<()> {
        self.store.update("")?;
        info!("board reset");
        Ok(())
    }

    /// Counts entries on the board.
    pub fn count(&self) -> StoreResult<usize> {
        Ok(codec::count_entries(&self.store.fetch()?))
    }

    /// Returns every entry on the board.
    pub fn entries(&self) -> StoreResult<Vec<String>> {
        let content = self.store.fetch()?;
        Ok(codec::entries(&content).map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::engine::{BoardEvent, PollOutcome};
    use crate::error::StoreError;
    use crate::transport::MemoryTransport;
    use std::time::Duration;

    fn config() -> BoardConfig {
        BoardConfig::new("gist", "token")
            .with_retry(RetryConfig::new(3).with_delay(Duration::ZERO))
            .with_cache_ttl(Duration::ZERO)
            .with_min_request_interval(Duration::ZERO)
    }

    type Shared = Arc<MemoryTransport>;

    fn open(content: &str) -> (Board<Shared>, SyncEngine<Shared>, Shared) {
        let transport = Arc::new(MemoryTransport::with_content(content));
        let (board, engine) = Board::open(&config(), Arc::clone(&transport));
        (board, engine, transport)
    }

    fn full_board(n: usize) -> String {
        (1..=n).map(|i| format!("m{}", i)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn append_to_empty_board() {
        let (board, _engine, transport) = open("");

        let outcome = board.append_message("hello").unwrap();

        assert_eq!(transport.content(), "hello");
        assert_eq!(
            outcome,
            AppendOutcome {
                truncated: false,
                entry_count: 1
            }
        );
        assert!(board.echo.is_armed());
    }

    #[test]
    fn append_adds_newline_separator() {
        let (board, _engine, transport) = open("a\nb");
        board.append_message("c").unwrap();
        assert_eq!(transport.content(), "a\nb\nc");
    }

    #[test]
    fn board_under_ceiling_is_not_cleared() {
        let (board, _engine, transport) = open(&full_board(44));

        let outcome = board.append_message("x").unwrap();

        assert!(!outcome.truncated);
        assert_eq!(outcome.entry_count, 45);
        assert_eq!(transport.write_log().len(), 1);
    }

    #[test]
    fn full_board_is_cleared_before_append() {
        let (board, _engine, transport) = open(&full_board(45));

        let outcome = board.append_message("x").unwrap();

        assert!(outcome.truncated);
        assert_eq!(outcome.entry_count, 1);
        assert_eq!(transport.write_log(), vec!["".to_string(), "x".to_string()]);
    }

    #[test]
    fn validation_rejects_bad_messages() {
        let (board, _engine, transport) = open("");

        assert_eq!(board.append_message("   "), Err(BoardError::EmptyMessage));
        assert_eq!(board.append_message("a\nb"), Err(BoardError::MultilineMessage));
        assert_eq!(
            board.append_message(&"x".repeat(51)),
            Err(BoardError::MessageTooLong { len: 51, max: 50 })
        );
        assert!(board.validate(&"é".repeat(50)).is_ok());
        assert_eq!(transport.read_count(), 0);
    }

    #[test]
    fn offline_append_writes_nothing() {
        let (board, _engine, transport) = open("a");
        transport.set_connected(false);

        let err = board.append_message("b").unwrap_err();

        assert!(matches!(err, BoardError::Offline(StoreError::Unavailable { .. })));
        assert_eq!(transport.write_count(), 0);
        assert!(!board.echo.is_armed());
    }

    #[test]
    fn failed_truncation_aborts_append() {
        let (board, _engine, transport) = open(&full_board(45));
        transport.fail_next_writes(3);

        let err = board.append_message("x").unwrap_err();

        assert!(matches!(err, BoardError::TruncateFailed(_)));
        assert_eq!(transport.content(), full_board(45));
        assert!(!board.echo.is_armed());
    }

    #[test]
    fn failed_write_leaves_flag_disarmed() {
        let (board, _engine, transport) = open("a");
        transport.fail_next_writes(3);

        let err = board.append_message("b").unwrap_err();

        assert!(matches!(err, BoardError::WriteFailed(_)));
        assert_eq!(transport.content(), "a");
        assert!(!board.echo.is_armed());
    }

    #[test]
    fn reset_and_count() {
        let (board, _engine, transport) = open("a\n\nb\n");
        assert_eq!(board.count().unwrap(), 2);
        assert_eq!(board.entries().unwrap(), vec!["a", "b"]);

        board.reset_board().unwrap();
        assert_eq!(transport.content(), "");
        assert_eq!(board.count().unwrap(), 0);
    }

    #[test]
    fn own_append_is_not_echoed() {
        let (board, mut engine, transport) = open("a");
        let rx = engine.subscribe();
        engine.poll_once();
        rx.try_recv().unwrap();

        board.append_message("mine").unwrap();
        let outcome = engine.poll_once();

        assert_eq!(
            outcome,
            PollOutcome::Changed {
                displayed: 0,
                suppressed: true
            }
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(transport.content(), "a\nmine");
    }

    #[test]
    fn other_writers_are_displayed_after_own_append() {
        let (board, mut engine, transport) = open("a");
        let rx = engine.subscribe();
        engine.poll_once();
        rx.try_recv().unwrap();

        board.append_message("mine").unwrap();
        transport.set_content("a\nmine\ntheirs");
        engine.poll_once();

        assert_eq!(
            rx.try_recv().unwrap(),
            BoardEvent::Entries {
                entries: vec!["theirs".into()],
                initial: false
            }
        );
    }

    #[test]
    fn truncating_append_keeps_flag_armed() {
        let (board, mut engine, _transport) = open(&full_board(45));
        let rx = engine.subscribe();
        engine.poll_once();
        rx.try_recv().unwrap();

        board.append_message("x").unwrap();
        let outcome = engine.poll_once();

        // The shrink is absorbed, so the flag survives to the next growth.
        assert_eq!(
            outcome,
            PollOutcome::Changed {
                displayed: 0,
                suppressed: false
            }
        );
        assert!(board.echo.is_armed());
    }
}
