pub mod batch;
mod chunker;
pub mod config;
pub mod cookies;
pub mod error;
pub mod metadata;
pub mod progress;
mod retry;
pub mod side_effects;
pub mod studio;
pub mod transport;
pub mod uploader;

pub use config::{RetryPolicy, UploaderConfig};
pub use cookies::Session;
pub use error::{ApiError, MetadataError, SideEffectError, SideEffectStep, UploadError};
pub use metadata::{Metadata, MetadataRecord};
pub use progress::{NoopReporter, Phase, ProgressReporter};
pub use uploader::{UploadOutcome, UploadState, Uploader};
