//! Configuration for the board client.

use std::fmt;
use std::time::Duration;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default file name inside the gist.
pub const DEFAULT_FILENAME: &str = "gistfile1.txt";

/// Entry count at which the board is cleared before the next append.
pub const DEFAULT_CEILING: usize = 45;

/// Maximum length, in characters, of a locally authored entry.
pub const DEFAULT_MAX_ENTRY_LEN: usize = 50;

/// Configuration for the document store, sync loop and board controller.
#[derive(Clone)]
pub struct BoardConfig {
    /// Gist identifier.
    pub gist_id: String,
    /// File inside the gist that holds the board.
    pub filename: String,
    /// API base URL (no trailing slash).
    pub api_base: String,
    /// Bearer token sent with every request.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry configuration for reads and writes.
    pub retry: RetryConfig,
    /// How long a fetched snapshot may be reused.
    pub cache_ttl: Duration,
    /// Minimum spacing between outgoing requests.
    pub min_request_interval: Duration,
    /// Interval between poll cycles.
    pub poll_interval: Duration,
    /// Wait after a failed poll cycle.
    pub error_backoff: Duration,
    /// Entry count that forces a truncation before appending.
    pub ceiling: usize,
    /// Maximum length of a locally authored entry.
    pub max_entry_len: usize,
}

impl BoardConfig {
    /// Creates a new configuration for the given gist and token.
    pub fn new(gist_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            gist_id: gist_id.into(),
            filename: DEFAULT_FILENAME.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
            cache_ttl: Duration::from_secs(1),
            min_request_interval: Duration::from_millis(500),
            poll_interval: Duration::from_secs(2),
            error_backoff: Duration::from_secs(5),
            ceiling: DEFAULT_CEILING,
            max_entry_len: DEFAULT_MAX_ENTRY_LEN,
        }
    }

    /// Sets the file name inside the gist.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Sets the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the snapshot freshness window.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sets the minimum spacing between requests.
    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// Sets the poll interval and the backoff used after a failed cycle.
    pub fn with_poll_intervals(mut self, poll: Duration, error_backoff: Duration) -> Self {
        self.poll_interval = poll;
        self.error_backoff = error_backoff;
        self
    }

    /// Sets the truncation ceiling.
    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Sets the maximum entry length.
    pub fn with_max_entry_len(mut self, len: usize) -> Self {
        self.max_entry_len = len;
        self
    }

    /// Returns the document URL, `<api_base>/gists/<gist_id>`.
    pub fn document_url(&self) -> String {
        format!("{}/gists/{}", self.api_base, self.gist_id)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl fmt::Debug for BoardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardConfig")
            .field("gist_id", &self.gist_id)
            .field("filename", &self.filename)
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("cache_ttl", &self.cache_ttl)
            .field("min_request_interval", &self.min_request_interval)
            .field("poll_interval", &self.poll_interval)
            .field("error_backoff", &self.error_backoff)
            .field("ceiling", &self.ceiling)
            .field("max_entry_len", &self.max_entry_len)
            .finish()
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Multiplier applied per retry. 1.0 keeps the delay fixed.
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Creates a retry configuration with the default fixed delay.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 1.0,
        }
    }

    /// Creates a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Sets the delay between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates the delay before a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_secs = self.delay.as_secs_f64()
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);

        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3)
    }
}
