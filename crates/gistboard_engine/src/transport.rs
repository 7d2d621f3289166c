//! Transport layer abstraction for the document store.

use crate::error::{StoreError, StoreResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// A document transport reads and overwrites the remote board text.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (the gist HTTP API, in-memory for testing, etc.).
/// Implementations perform exactly one attempt per call; retries,
/// spacing and caching live in [`crate::DocumentStore`].
pub trait DocumentTransport: Send + Sync {
    /// Reads the full document text.
    ///
    /// A document whose file is missing on the remote side reads as empty.
    fn read(&self) -> StoreResult<String>;

    /// Overwrites the full document text.
    fn write(&self, content: &str) -> StoreResult<()>;
}

impl<T: DocumentTransport + ?Sized> DocumentTransport for Arc<T> {
    fn read(&self) -> StoreResult<String> {
        (**self).read()
    }

    fn write(&self, content: &str) -> StoreResult<()> {
        (**self).write(content)
    }
}

/// An in-memory transport for testing.
///
/// Holds the document text directly and counts every call, so tests can
/// tell cache hits from network round trips. Failures can be injected for
/// a number of upcoming calls or for as long as the transport is
/// disconnected.
#[derive(Debug)]
pub struct MemoryTransport {
    content: Mutex<String>,
    connected: AtomicBool,
    failing_reads: AtomicU32,
    failing_writes: AtomicU32,
    reads: AtomicU64,
    writes: AtomicU64,
    write_log: Mutex<Vec<String>>,
}

impl MemoryTransport {
    /// Creates a transport holding an empty document.
    pub fn new() -> Self {
        Self::with_content("")
    }

    /// Creates a transport holding the given document.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(content.into()),
            connected: AtomicBool::new(true),
            failing_reads: AtomicU32::new(0),
            failing_writes: AtomicU32::new(0),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            write_log: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the document, as another writer would.
    pub fn set_content(&self, content: impl Into<String>) {
        *self.content.lock() = content.into();
    }

    /// Returns the current document.
    pub fn content(&self) -> String {
        self.content.lock().clone()
    }

    /// Sets the connected state. A disconnected transport fails every call.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Makes the next `count` reads fail.
    pub fn fail_next_reads(&self, count: u32) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    /// Makes the next `count` writes fail.
    pub fn fail_next_writes(&self, count: u32) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Returns the number of read calls, failed ones included.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Returns the number of write calls, failed ones included.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns every successfully written document, oldest first.
    pub fn write_log(&self) -> Vec<String> {
        self.write_log.lock().clone()
    }

    fn check_failure(&self, pending: &AtomicU32) -> StoreResult<()> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(StoreError::transport_retryable("connection refused"));
        }
        let injected = pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::transport_retryable("injected failure"));
        }
        Ok(())
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTransport for MemoryTransport {
    fn read(&self) -> StoreResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_failure(&self.failing_reads)?;
        Ok(self.content())
    }

    fn write(&self, content: &str) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_failure(&self.failing_writes)?;
        self.set_content(content);
        self.write_log.lock().push(content.to_string());
        Ok(())
    }
}
