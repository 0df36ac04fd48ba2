use std::fmt;

use thiserror::Error;

/// Errors raised at the host API seam.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection reset, timeout, DNS failure and the like.
    #[error("network error: {0}")]
    Network(String),
    /// 5xx or 429 from the host.
    #[error("server error ({status}): {body}")]
    Server { status: u16, body: String },
    /// The host understood the request and refused it. Resending cannot help.
    #[error("request rejected ({status}): {reason}")]
    Rejected { status: u16, reason: String },
    /// The response did not have the shape we expected.
    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl ApiError {
    /// Whether resending the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server { .. })
    }
}

/// Local validation failures for a metadata record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("{field} is {len} characters, max is {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("{0} must not contain '<' or '>'")]
    AngleBrackets(&'static str),
    #[error("invalid premiere countdown: {0} seconds")]
    PremiereCountdown(u32),
    #[error("invalid language tag: {0}")]
    Language(String),
}

/// Fatal outcomes of an upload. Side-effect failures are not here, see [`SideEffectError`].
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("invalid credentials: {0}")]
    Credentials(String),
    #[error("could not open upload slot: {0}")]
    UploadInit(#[source] ApiError),
    #[error("upload transfer failed after {attempts} attempts at byte {offset}: {source}")]
    UploadTransport {
        offset: u64,
        attempts: u32,
        #[source]
        source: ApiError,
    },
    /// The video exists on the host as a private draft; `video_id` names it.
    #[error("metadata for video {video_id} rejected by host: {reason}")]
    MetadataRejected { video_id: String, reason: String },
    /// The video exists on the host as a private draft; `video_id` names it.
    #[error("could not set metadata for video {video_id}: {source}")]
    MetadataTransport {
        video_id: String,
        #[source]
        source: ApiError,
    },
    #[error("invalid metadata: {0}")]
    InvalidMetadata(#[from] MetadataError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Id of the video left on the host when the upload failed after creating it.
    pub fn video_id(&self) -> Option<&str> {
        match self {
            UploadError::MetadataRejected { video_id, .. }
            | UploadError::MetadataTransport { video_id, .. } => Some(video_id),
            _ => None,
        }
    }
}

/// Which optional step a [`SideEffectError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffectStep {
    Thumbnail,
    Playlist,
    Scheduling,
}

impl fmt::Display for SideEffectStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SideEffectStep::Thumbnail => "thumbnail",
            SideEffectStep::Playlist => "playlist",
            SideEffectStep::Scheduling => "scheduling",
        };
        f.write_str(name)
    }
}

/// A failed optional step. Reported next to a successful upload, never raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{step} step failed: {message}")]
pub struct SideEffectError {
    pub step: SideEffectStep,
    pub message: String,
}

impl SideEffectError {
    pub fn new(step: SideEffectStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}
