//! Document store client: caching, request spacing and retries.

use crate::config::{BoardConfig, RetryConfig};
use crate::error::{StoreError, StoreResult};
use crate::transport::DocumentTransport;
use parking_lot::{Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A timestamped local copy of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Document text.
    pub content: String,
    /// When the request that produced this copy started.
    pub taken_at: Instant,
}

impl Snapshot {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.taken_at) < ttl
    }
}

/// Counters for store activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Requests sent to the transport, failed attempts included.
    pub requests: u64,
    /// Fetches answered from the cache.
    pub cache_hits: u64,
    /// Attempts that were retries of a failed attempt.
    pub retries: u64,
    /// Operations that failed on every attempt.
    pub failures: u64,
}

/// Client for the remote document.
///
/// Every successful fetch or update replaces the cached snapshot, so a
/// process always reads its own writes. Other processes' writes become
/// visible once the snapshot is older than the freshness window.
pub struct DocumentStore<T: DocumentTransport> {
    transport: T,
    retry: RetryConfig,
    cache_ttl: Duration,
    min_request_interval: Duration,
    cache: RwLock<Option<Snapshot>>,
    last_request: Mutex<Option<Instant>>,
    stats: RwLock<StoreStats>,
}

impl<T: DocumentTransport> DocumentStore<T> {
    /// Creates a store over the given transport.
    pub fn new(config: &BoardConfig, transport: T) -> Self {
        Self {
            transport,
            retry: config.retry.clone(),
            cache_ttl: config.cache_ttl,
            min_request_interval: config.min_request_interval,
            cache: RwLock::new(None),
            last_request: Mutex::new(None),
            stats: RwLock::new(StoreStats::default()),
        }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the cached snapshot, fresh or not.
    pub fn cached(&self) -> Option<Snapshot> {
        self.cache.read().clone()
    }

    /// Returns the current stats.
    pub fn stats(&self) -> StoreStats {
        self.stats.read().clone()
    }

    /// Fetches the document.
    ///
    /// Answers from the cache while the snapshot is fresh. Otherwise reads
    /// through the transport with retries; on exhaustion returns
    /// [`StoreError::Unavailable`] and leaves the cache as it was.
    pub fn fetch(&self) -> StoreResult<String> {
        let started = Instant::now();

        if let Some(snapshot) = self.cache.read().as_ref() {
            if snapshot.is_fresh(self.cache_ttl, started) {
                self.stats.write().cache_hits += 1;
                return Ok(snapshot.content.clone());
            }
        }

        let content = self
            .with_retry("fetch", || self.transport.read())
            .map_err(|(attempts, err)| StoreError::Unavailable {
                attempts,
                last_error: err.to_string(),
            })?;

        // Age counts from the start of the request.
        *self.cache.write() = Some(Snapshot {
            content: content.clone(),
            taken_at: started,
        });
        Ok(content)
    }

    /// Overwrites the document.
    ///
    /// On success the cache holds `content`. On exhaustion returns
    /// [`StoreError::WriteFailed`]; the write may or may not have landed.
    pub fn update(&self, content: &str) -> StoreResult<()> {
        let requested = Instant::now();

        self.with_retry("update", || self.transport.write(content))
            .map_err(|(attempts, err)| StoreError::WriteFailed {
                attempts,
                last_error: err.to_string(),
            })?;

        *self.cache.write() = Some(Snapshot {
            content: content.to_string(),
            taken_at: requested,
        });
        Ok(())
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out. Errors carry the number of attempts made.
    fn with_retry<R>(
        &self,
        operation: &'static str,
        mut op: impl FnMut() -> StoreResult<R>,
    ) -> Result<R, (u32, StoreError)> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                thread::sleep(self.retry.delay_for_attempt(attempt));
                self.stats.write().retries += 1;
            }

            self.pace();
            self.stats.write().requests += 1;

            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if err.is_retryable() && attempt + 1 < max_attempts {
                        debug!(
                            operation,
                            attempt = attempt + 1,
                            max_attempts,
                            error = %err,
                            "request failed, retrying in {:?}",
                            self.retry.delay_for_attempt(attempt + 1)
                        );
                        last_error = Some(err);
                        continue;
                    }
                    warn!(operation, attempts = attempt + 1, error = %err, "request failed");
                    self.stats.write().failures += 1;
                    return Err((attempt + 1, err));
                }
            }
        }

        Err((
            max_attempts,
            last_error.unwrap_or_else(|| StoreError::Protocol("no attempts made".into())),
        ))
    }

    /// Sleeps until the minimum spacing since the previous request has passed.
    fn pace(&self) {
        let mut last = self.last_request.lock();
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_request_interval {
                let wait = self.min_request_interval - elapsed;
                debug!(?wait, "spacing request");
                thread::sleep(wait);
            }
        }
        *last = Some(Instant::now());
    }
}
