use std::time::Duration;

// Endpoints
pub const STUDIO_ORIGIN: &str = "https://studio.youtube.com";
pub const UPLOAD_ENDPOINT: &str = "https://upload.youtube.com/upload/studio";
pub const INNERTUBE_BASE: &str = "https://studio.youtube.com/youtubei/v1";
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

// Transfer parameters
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1_048_576; // 8 MiB
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

// Retry parameters
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 30_000;

// Metadata limits
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_TAGS_LEN: usize = 500;

/// Cookies that must be present for the session to sign requests, in order of preference.
pub const SAPISID_COOKIES: [&str; 2] = ["SAPISID", "__Secure-3PAPISID"];

/// Cookie domains forwarded to the host.
pub const COOKIE_DOMAINS: [&str; 2] = ["youtube.com", "google.com"];

/// Percent range `(start, end)` owned by each phase of an upload.
///
/// The ranges tile 0..=100 without gaps so a caller can drive one progress bar
/// across the whole call.
pub const UPLOAD_RANGE: (u8, u8) = (0, 80);
pub const METADATA_RANGE: (u8, u8) = (80, 90);
pub const THUMBNAIL_RANGE: (u8, u8) = (90, 94);
pub const PLAYLISTS_RANGE: (u8, u8) = (94, 97);
pub const SCHEDULING_RANGE: (u8, u8) = (97, 100);

/// Capped exponential backoff applied to every retryable request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// A policy that retries without sleeping. Handy for tests and mock hosts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            max_delay: Duration::from_millis(DEFAULT_BACKOFF_MAX_MS),
        }
    }
}

/// Runtime configuration for an upload session.
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub chunk_size: usize,
    pub retry: RetryPolicy,
    /// Applied per HTTP request, never to a whole upload.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl UploaderConfig {
    /// Chunk size actually used by the transport. A zero size would never make progress.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Map `fraction` (0.0..=1.0) of a phase onto its slice of the overall range.
pub fn scale_into(range: (u8, u8), fraction: f64) -> u8 {
    let (start, end) = range;
    let fraction = fraction.clamp(0.0, 1.0);
    start + ((end - start) as f64 * fraction).floor() as u8
}
