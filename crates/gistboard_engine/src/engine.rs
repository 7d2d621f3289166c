//! Sync engine: the background loop that watches the board.

use crate::codec;
use crate::config::BoardConfig;
use crate::echo::EchoSuppressor;
use crate::error::StoreError;
use crate::store::DocumentStore;
use crate::transport::DocumentTransport;
use parking_lot::{Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The current state of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No poll cycle has run yet.
    Initializing,
    /// The engine is polling.
    Polling,
    /// The loop has exited.
    Stopped,
}

/// Event published to subscribers of the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// Entries to display, in board order.
    Entries {
        /// Entry texts without any display marker.
        entries: Vec<String>,
        /// True for the initial load of the whole board.
        initial: bool,
    },
    /// The board became unreachable.
    Offline {
        /// Description of the last failure.
        error: String,
    },
    /// The board is reachable again after being offline.
    Reconnected,
}

/// Result of a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The board did not change since the last cycle.
    Unchanged,
    /// The board changed.
    Changed {
        /// Number of entries published.
        displayed: usize,
        /// Whether the local echo was skipped.
        suppressed: bool,
    },
    /// The board could not be fetched.
    Failed(StoreError),
}

/// Statistics about poll cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Cycles run, failed ones included.
    pub cycles: u64,
    /// Cycles whose fetch failed.
    pub failed_cycles: u64,
    /// Entries published for display.
    pub entries_displayed: u64,
    /// Local echoes skipped.
    pub echoes_suppressed: u64,
}

/// Process-wide stop signal for the sync loop.
///
/// Triggering it also wakes a loop that is sleeping between cycles.
#[derive(Debug, Default)]
pub struct Shutdown {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl Shutdown {
    /// Creates an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown.
    pub fn trigger(&self) {
        *self.stopped.lock() = true;
        self.wake.notify_all();
    }

    /// Returns true once shutdown was requested.
    pub fn is_triggered(&self) -> bool {
        *self.stopped.lock()
    }

    /// Waits up to `timeout`; returns true if shutdown was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        self.wake
            .wait_while_for(&mut stopped, |stopped| !*stopped, timeout);
        *stopped
    }
}

/// Watches the board and publishes newly appended entries.
///
/// New entries are found by line count; see [`codec::split_new_entries`].
pub struct SyncEngine<T: DocumentTransport> {
    store: Arc<DocumentStore<T>>,
    echo: Arc<EchoSuppressor>,
    poll_interval: Duration,
    error_backoff: Duration,
    last_seen: Option<String>,
    offline: bool,
    state: SyncState,
    stats: SyncStats,
    subscribers: Vec<Sender<BoardEvent>>,
}

impl<T: DocumentTransport> SyncEngine<T> {
    /// Creates an engine over a shared store and echo flag.
    pub fn new(
        config: &BoardConfig,
        store: Arc<DocumentStore<T>>,
        echo: Arc<EchoSuppressor>,
    ) -> Self {
        Self {
            store,
            echo,
            poll_interval: config.poll_interval,
            error_backoff: config.error_backoff,
            last_seen: None,
            offline: false,
            state: SyncState::Initializing,
            stats: SyncStats::default(),
            subscribers: Vec::new(),
        }
    }

    /// Subscribes to board events.
    pub fn subscribe(&mut self) -> Receiver<BoardEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.clone()
    }

    /// Returns the last content seen by a successful cycle.
    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Runs one cycle: fetch, diff against the last-seen content, publish.
    pub fn poll_once(&mut self) -> PollOutcome {
        self.stats.cycles += 1;

        let content = match self.store.fetch() {
            Ok(content) => content,
            Err(err) => {
                self.stats.failed_cycles += 1;
                if !self.offline {
                    self.offline = true;
                    self.publish(BoardEvent::Offline {
                        error: err.to_string(),
                    });
                }
                return PollOutcome::Failed(err);
            }
        };

        if self.offline {
            self.offline = false;
            self.publish(BoardEvent::Reconnected);
        }

        self.apply(content)
    }

    fn apply(&mut self, content: String) -> PollOutcome {
        let (entries, suppressed, initial) = match self.last_seen.as_deref() {
            None => {
                let entries: Vec<String> = codec::entries(&content).map(str::to_string).collect();
                (entries, false, true)
            }
            Some(previous) if previous == content => return PollOutcome::Unchanged,
            Some(previous) => {
                let mut echo = self.echo.lock();
                let mut new_lines = codec::split_new_entries(previous, &content);
                let suppressed = !new_lines.is_empty() && echo.take();
                if suppressed {
                    new_lines.remove(0);
                }
                let entries: Vec<String> = new_lines
                    .into_iter()
                    .filter(|line| !codec::is_blank(line))
                    .map(str::to_string)
                    .collect();
                (entries, suppressed, false)
            }
        };

        self.last_seen = Some(content);

        let displayed = entries.len();
        self.stats.entries_displayed += displayed as u64;
        if suppressed {
            self.stats.echoes_suppressed += 1;
            debug!("skipped echo of local entry");
        }
        if !entries.is_empty() {
            self.publish(BoardEvent::Entries { entries, initial });
        }

        PollOutcome::Changed {
            displayed,
            suppressed,
        }
    }

    fn publish(&mut self, event: BoardEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Polls until `shutdown` is triggered.
    ///
    /// A failed cycle waits for the error backoff instead of the poll
    /// interval. Nothing that happens inside a cycle ends the loop.
    pub fn run(&mut self, shutdown: &Shutdown) -> SyncStats {
        self.state = SyncState::Polling;
        info!(interval = ?self.poll_interval, "sync loop started");

        while !shutdown.is_triggered() {
            let wait = match panic::catch_unwind(AssertUnwindSafe(|| self.poll_once())) {
                Ok(PollOutcome::Failed(err)) => {
                    debug!(error = %err, "poll cycle failed");
                    self.error_backoff
                }
                Ok(_) => self.poll_interval,
                Err(_) => {
                    warn!("poll cycle panicked");
                    self.error_backoff
                }
            };

            if shutdown.wait(wait) {
                break;
            }
        }

        self.state = SyncState::Stopped;
        info!(cycles = self.stats.cycles, "sync loop stopped");
        self.stats.clone()
    }
}

impl<T: DocumentTransport + 'static> SyncEngine<T> {
    /// Runs the loop on a background thread.
    ///
    /// The thread holds no resources needing cleanup; callers may trigger
    /// `shutdown` and leave without joining.
    pub fn spawn(mut self, shutdown: Arc<Shutdown>) -> std::io::Result<JoinHandle<SyncStats>> {
        thread::Builder::new()
            .name("gistboard-sync".into())
            .spawn(move || self.run(&shutdown))
    }
}
