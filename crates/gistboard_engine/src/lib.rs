//! # Gistboard Engine
//!
//! A small shared message board stored as one text file in a remote
//! gist-style document store.
//!
//! This crate provides:
//! - Document store client with caching, request spacing and retries
//! - Newline-delimited board codec
//! - Truncation policy keeping the board bounded
//! - Background sync loop publishing newly appended entries
//! - Board controller with echo suppression for local appends
//!
//! ## Architecture
//!
//! Every participant reads and overwrites the whole document. There is no
//! locking on the remote side, so concurrent appends race and the last
//! write wins:
//! 1. The controller fetches, optionally clears, appends and writes back
//! 2. The sync loop polls, diffs line counts and publishes new entries
//! 3. The echo flag keeps a process from displaying its own append
//!
//! ## Key Invariants
//!
//! - Blank lines are never counted or displayed
//! - The board never holds more than `ceiling` entries after a local append
//! - A failed fetch never replaces the cached snapshot
//! - Nothing inside a poll cycle stops the sync loop

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod board;
pub mod codec;
mod config;
mod echo;
mod engine;
mod error;
mod http;
mod policy;
mod store;
mod transport;

pub use board::{AppendOutcome, Board};
pub use config::{
    BoardConfig, RetryConfig, DEFAULT_API_BASE, DEFAULT_CEILING, DEFAULT_FILENAME,
    DEFAULT_MAX_ENTRY_LEN,
};
pub use echo::{EchoGuard, EchoSuppressor};
pub use engine::{BoardEvent, PollOutcome, Shutdown, SyncEngine, SyncState, SyncStats};
pub use error::{BoardError, BoardResult, StoreError, StoreResult};
pub use http::{GistTransport, HttpClient, UreqClient};
pub use policy::{should_truncate, TruncationPolicy};
pub use store::{DocumentStore, Snapshot, StoreStats};
pub use transport::{DocumentTransport, MemoryTransport};
