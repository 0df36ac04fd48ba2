//! Optional steps after the metadata commit: thumbnail, playlists, scheduling.
//!
//! Each step is best-effort. A failure is recorded as a [`SideEffectError`]
//! and the remaining steps still run; the uploaded video is never rolled back.

use std::path::Path;

use log::{info, warn};

use crate::error::{SideEffectError, SideEffectStep, UploadError};
use crate::metadata::MetadataRecord;
use crate::progress::{Phase, ProgressTracker};
use crate::studio::{MetadataUpdate, Schedule, StudioApi, StudioClient};
use crate::transport::ResumableTransport;

/// Decide how `record` goes live, if it is scheduled at all.
///
/// A premiere needs the schedule plus both the countdown and the theme. With
/// only one of the two the video is scheduled privately like any other.
pub fn plan_schedule(record: &MetadataRecord) -> Option<Schedule> {
    let at = record.scheduled_upload?;
    match (record.premiere_countdown_duration, record.premiere_theme) {
        (Some(countdown), Some(theme)) => Some(Schedule::Premiere {
            at,
            countdown,
            theme,
        }),
        (None, None) => Some(Schedule::Private { at }),
        _ => {
            warn!("premiere needs both a countdown and a theme; scheduling as private instead");
            Some(Schedule::Private { at })
        }
    }
}

pub struct SideEffects<'c, 'a, A: StudioApi> {
    client: &'c StudioClient<'a, A>,
    chunk_size: usize,
}

impl<'c, 'a, A: StudioApi> SideEffects<'c, 'a, A> {
    pub fn new(client: &'c StudioClient<'a, A>, chunk_size: usize) -> Self {
        Self { client, chunk_size }
    }

    /// Run every optional step `record` asks for, in order. Returns the failures.
    pub fn apply(
        &self,
        video_id: &str,
        record: &MetadataRecord,
        progress: &mut ProgressTracker<'_>,
    ) -> Vec<SideEffectError> {
        let mut warnings = Vec::new();

        if let Some(path) = &record.thumbnail {
            if let Err(e) = self.set_thumbnail(video_id, path) {
                warn!("thumbnail for {video_id} failed: {e}");
                warnings.push(SideEffectError::new(SideEffectStep::Thumbnail, e.to_string()));
            }
        }
        progress.complete(Phase::Thumbnail);

        let total = record.playlist_ids.len();
        for (i, playlist_id) in record.playlist_ids.iter().enumerate() {
            if let Err(e) = self.add_to_playlist(video_id, playlist_id) {
                warn!("adding {video_id} to playlist {playlist_id} failed: {e}");
                warnings.push(SideEffectError::new(
                    SideEffectStep::Playlist,
                    format!("{playlist_id}: {e}"),
                ));
            }
            progress.advance(Phase::Playlists, (i + 1) as f64 / total as f64);
        }
        progress.complete(Phase::Playlists);

        if record.scheduled_upload.is_none()
            && (record.premiere_countdown_duration.is_some() || record.premiere_theme.is_some())
        {
            warn!("premiere settings ignored: no scheduled_upload time given");
        }
        if let Some(schedule) = plan_schedule(record) {
            if let Err(e) = self.schedule(video_id, schedule) {
                warn!("scheduling {video_id} failed: {e}");
                warnings.push(SideEffectError::new(SideEffectStep::Scheduling, e.to_string()));
            }
        }
        progress.complete(Phase::Scheduling);

        warnings
    }

    fn set_thumbnail(&self, video_id: &str, path: &Path) -> Result<(), UploadError> {
        let transport = ResumableTransport::new(self.client, self.chunk_size);
        let mut job = transport.begin(path)?;
        transport.transfer(&mut job, |_, _| {})?;

        let update = MetadataUpdate {
            thumbnail_resource_id: Some(job.slot().resource_id.clone()),
            ..Default::default()
        };
        self.update(video_id, &update)?;
        info!("thumbnail {} attached to {video_id}", path.display());
        Ok(())
    }

    fn add_to_playlist(&self, video_id: &str, playlist_id: &str) -> Result<(), UploadError> {
        let update = MetadataUpdate {
            add_to_playlists: vec![playlist_id.to_string()],
            ..Default::default()
        };
        self.update(video_id, &update)?;
        info!("added {video_id} to playlist {playlist_id}");
        Ok(())
    }

    fn schedule(&self, video_id: &str, schedule: Schedule) -> Result<(), UploadError> {
        match &schedule {
            Schedule::Private { at } => info!("scheduling {video_id} to go public at {at}"),
            Schedule::Premiere { at, .. } => info!("scheduling {video_id} as a premiere at {at}"),
        }
        let update = MetadataUpdate {
            schedule: Some(schedule),
            ..Default::default()
        };
        self.update(video_id, &update)
    }

    fn update(&self, video_id: &str, update: &MetadataUpdate) -> Result<(), UploadError> {
        self.client
            .update_metadata(video_id, update)
            .map_err(|(source, _)| UploadError::MetadataTransport {
                video_id: video_id.to_string(),
                source,
            })
    }
}
