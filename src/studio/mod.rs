//! The host API seam.
//!
//! Every platform URL and payload shape lives behind [`StudioApi`]; the rest
//! of the crate only sees the typed requests defined here. [`http::HttpStudio`]
//! talks to the real service.

pub mod http;

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::RetryPolicy;
use crate::cookies::Session;
use crate::error::ApiError;
use crate::metadata::{
    Category, CommentMode, CommentSortOrder, LanguageTag, License, PremiereCountdown,
    PremiereTheme, Privacy,
};
use crate::retry::with_retry;

/// Values scraped from the studio page on first use and reused for every
/// request of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioContext {
    pub api_key: String,
    pub channel_id: String,
    pub delegated_session_id: Option<String>,
    pub client_version: String,
}

/// A server-allocated target that accepts sequential byte ranges for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSlot {
    pub upload_url: String,
    /// Identifier of the uploaded bytes, referenced by later requests.
    pub resource_id: String,
}

/// Attributes sent when the uploaded bytes are turned into a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialVideo {
    pub frontend_upload_id: String,
    pub title: String,
    pub description: String,
    pub privacy: Privacy,
}

/// When and how a video goes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Private until `at`, then public.
    Private { at: DateTime<Utc> },
    /// Public premiere with a countdown starting at `at`.
    Premiere {
        at: DateTime<Utc>,
        countdown: PremiereCountdown,
        theme: PremiereTheme,
    },
}

/// A partial update of a video's attributes. `None` and empty fields are left
/// untouched on the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<Privacy>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Category>,
    pub license: Option<License>,
    pub made_for_kids: Option<bool>,
    pub restricted_to_over_18: Option<bool>,
    pub allow_comments: Option<bool>,
    pub comment_mode: Option<CommentMode>,
    pub comment_sort_order: Option<CommentSortOrder>,
    pub can_view_ratings: Option<bool>,
    pub allow_embedding: Option<bool>,
    pub publish_to_feed: Option<bool>,
    pub auto_chapter: Option<bool>,
    pub auto_places: Option<bool>,
    pub auto_concepts: Option<bool>,
    pub has_product_placement: Option<bool>,
    pub show_product_placement_overlay: Option<bool>,
    pub recorded_date: Option<NaiveDate>,
    pub audio_language: Option<LanguageTag>,
    pub thumbnail_resource_id: Option<String>,
    pub add_to_playlists: Vec<String>,
    pub schedule: Option<Schedule>,
}

/// Operations the upload session needs from the host.
///
/// Implementations perform exactly one request per call; retry policy belongs
/// to the caller.
pub trait StudioApi {
    /// Fetch the per-session values the other calls need.
    fn bootstrap(&self, session: &Session) -> Result<StudioContext, ApiError>;

    /// Open a resumable upload slot for `size` bytes.
    fn start_upload(
        &self,
        session: &Session,
        file_name: &str,
        size: u64,
        frontend_upload_id: &str,
    ) -> Result<UploadSlot, ApiError>;

    /// Send `data` starting at `offset`. Returns the offset the server has
    /// acknowledged after this call. `finalize` marks the last chunk.
    fn upload_chunk(
        &self,
        session: &Session,
        slot: &UploadSlot,
        offset: u64,
        data: &[u8],
        finalize: bool,
    ) -> Result<u64, ApiError>;

    /// Ask the server how many bytes of the slot it holds.
    fn query_offset(&self, session: &Session, slot: &UploadSlot) -> Result<u64, ApiError>;

    /// Turn a completed slot into a video. Returns the video id.
    fn create_video(
        &self,
        session: &Session,
        context: &StudioContext,
        slot: &UploadSlot,
        initial: &InitialVideo,
    ) -> Result<String, ApiError>;

    fn update_metadata(
        &self,
        session: &Session,
        context: &StudioContext,
        video_id: &str,
        update: &MetadataUpdate,
    ) -> Result<(), ApiError>;
}

impl<T: StudioApi + ?Sized> StudioApi for &T {
    fn bootstrap(&self, session: &Session) -> Result<StudioContext, ApiError> {
        (**self).bootstrap(session)
    }

    fn start_upload(
        &self,
        session: &Session,
        file_name: &str,
        size: u64,
        frontend_upload_id: &str,
    ) -> Result<UploadSlot, ApiError> {
        (**self).start_upload(session, file_name, size, frontend_upload_id)
    }

    fn upload_chunk(
        &self,
        session: &Session,
        slot: &UploadSlot,
        offset: u64,
        data: &[u8],
        finalize: bool,
    ) -> Result<u64, ApiError> {
        (**self).upload_chunk(session, slot, offset, data, finalize)
    }

    fn query_offset(&self, session: &Session, slot: &UploadSlot) -> Result<u64, ApiError> {
        (**self).query_offset(session, slot)
    }

    fn create_video(
        &self,
        session: &Session,
        context: &StudioContext,
        slot: &UploadSlot,
        initial: &InitialVideo,
    ) -> Result<String, ApiError> {
        (**self).create_video(session, context, slot, initial)
    }

    fn update_metadata(
        &self,
        session: &Session,
        context: &StudioContext,
        video_id: &str,
        update: &MetadataUpdate,
    ) -> Result<(), ApiError> {
        (**self).update_metadata(session, context, video_id, update)
    }
}

/// Everything a request needs, borrowed from the uploader for the length of one upload.
pub struct StudioClient<'a, A: StudioApi> {
    pub api: &'a A,
    pub session: &'a Session,
    pub context: &'a StudioContext,
    pub retry: &'a RetryPolicy,
}

impl<'a, A: StudioApi> StudioClient<'a, A> {
    /// `update_metadata` under the retry policy.
    pub fn update_metadata(
        &self,
        video_id: &str,
        update: &MetadataUpdate,
    ) -> Result<(), (ApiError, u32)> {
        with_retry(self.retry, "metadata update", || {
            self.api
                .update_metadata(self.session, self.context, video_id, update)
        })
    }
}
