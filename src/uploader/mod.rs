use std::fs::File;
use std::path::Path;

use log::{debug, info, warn};

use crate::config::{self, UploaderConfig};
use crate::cookies::{self, Session};
use crate::error::{ApiError, SideEffectError, UploadError};
use crate::metadata::{commit, MetadataRecord, Privacy};
use crate::progress::{Phase, ProgressReporter, ProgressTracker};
use crate::retry::with_retry;
use crate::side_effects::SideEffects;
use crate::studio::http::HttpStudio;
use crate::studio::{InitialVideo, StudioApi, StudioClient, StudioContext};
use crate::transport::ResumableTransport;

/// Where an upload is in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Init,
    Uploading,
    CommittingMetadata,
    ApplyingSideEffects,
    Done,
    Failed,
}

/// A video that exists on the host, plus any optional steps that failed.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub video_id: String,
    pub warnings: Vec<SideEffectError>,
}

impl UploadOutcome {
    pub fn url(&self) -> String {
        format!("{}{}", config::WATCH_URL_PREFIX, self.video_id)
    }
}

/// An authenticated upload session.
///
/// Built once from a cookie file and reused for any number of sequential
/// uploads. Uploads run in parallel need one `Uploader` each; clone the
/// [`Session`] to build them.
///
/// ```rust,no_run
/// use std::path::Path;
/// use youtube_up::{Metadata, MetadataRecord, NoopReporter, Uploader, UploaderConfig};
///
/// let mut uploader =
///     Uploader::from_cookies_file(Path::new("cookies.txt"), UploaderConfig::default()).unwrap();
/// let record = MetadataRecord::new(Metadata::new("My video")).unwrap();
/// let outcome = uploader
///     .upload(Path::new("video.mp4"), &record, &mut NoopReporter)
///     .unwrap();
/// println!("{}", outcome.url());
/// ```
pub struct Uploader<A: StudioApi = HttpStudio> {
    api: A,
    session: Session,
    cfg: UploaderConfig,
    context: Option<StudioContext>,
    state: UploadState,
}

impl Uploader<HttpStudio> {
    /// Load cookies and build an uploader that talks to the real host.
    pub fn from_cookies_file(path: &Path, cfg: UploaderConfig) -> Result<Self, UploadError> {
        let session = cookies::load(path)?;
        Self::with_session(session, cfg)
    }

    pub fn with_session(session: Session, cfg: UploaderConfig) -> Result<Self, UploadError> {
        let api = HttpStudio::new(&cfg).map_err(UploadError::UploadInit)?;
        Ok(Self::new(api, session, cfg))
    }
}

impl<A: StudioApi> Uploader<A> {
    pub fn new(api: A, session: Session, cfg: UploaderConfig) -> Self {
        Self {
            api,
            session,
            cfg,
            context: None,
            state: UploadState::Init,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.cfg
    }

    /// State reached by the most recent upload.
    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Upload `file` and publish it according to `metadata`.
    ///
    /// Phases report into fixed slices of the 0..=100 scale: upload 0-80,
    /// metadata 80-90, thumbnail 90-94, playlists 94-97, scheduling 97-100.
    /// On success the final event is always `(Phase::Done, 100)`, even if
    /// optional steps failed; those failures come back as warnings. Errors
    /// raised after the video was created carry its id, see
    /// [`UploadError::video_id`].
    pub fn upload(
        &mut self,
        file: &Path,
        metadata: &MetadataRecord,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<UploadOutcome, UploadError> {
        self.state = UploadState::Init;
        let result = self.run(file, metadata, reporter);
        match &result {
            Ok(outcome) => info!("uploaded {} as {}", file.display(), outcome.video_id),
            Err(e) => {
                warn!("upload of {} failed during {:?}: {e}", file.display(), self.state);
                if let Some(video_id) = e.video_id() {
                    warn!("video {video_id} was created and remains private on the host");
                }
                transition(&mut self.state, UploadState::Failed);
            }
        }
        result
    }

    fn run(
        &mut self,
        file: &Path,
        metadata: &MetadataRecord,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<UploadOutcome, UploadError> {
        let mut progress = ProgressTracker::new(reporter);

        File::open(file)?;
        let context = self.context()?;
        let client = StudioClient {
            api: &self.api,
            session: &self.session,
            context: &context,
            retry: &self.cfg.retry,
        };
        let chunk_size = self.cfg.effective_chunk_size();
        let transport = ResumableTransport::new(&client, chunk_size);

        let mut job = transport.begin(file)?;
        transition(&mut self.state, UploadState::Uploading);
        progress.report(Phase::Uploading, 0);
        transport.transfer(&mut job, |acked, total| {
            progress.advance(Phase::Uploading, acked as f64 / total as f64)
        })?;

        // Never public before the metadata and schedule say so.
        let initial = InitialVideo {
            frontend_upload_id: job.frontend_upload_id().to_string(),
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            privacy: Privacy::Private,
        };
        let video_id = transport.finalize(&mut job, &initial)?;
        progress.complete(Phase::Uploading);

        transition(&mut self.state, UploadState::CommittingMetadata);
        commit::commit(&client, &video_id, metadata)?;
        progress.complete(Phase::SettingMetadata);

        transition(&mut self.state, UploadState::ApplyingSideEffects);
        let warnings = SideEffects::new(&client, chunk_size).apply(&video_id, metadata, &mut progress);

        progress.finish();
        transition(&mut self.state, UploadState::Done);
        Ok(UploadOutcome { video_id, warnings })
    }

    /// The studio context, fetched on first use and cached for the session.
    fn context(&mut self) -> Result<StudioContext, UploadError> {
        if let Some(context) = &self.context {
            return Ok(context.clone());
        }
        let context = with_retry(&self.cfg.retry, "studio bootstrap", || {
            self.api.bootstrap(&self.session)
        })
        .map_err(|(e, _)| match e {
            ApiError::Rejected { reason, .. } => UploadError::Credentials(reason),
            e => UploadError::UploadInit(e),
        })?;
        debug!("bootstrapped studio session for channel {}", context.channel_id);
        self.context = Some(context.clone());
        Ok(context)
    }
}

fn transition(state: &mut UploadState, next: UploadState) {
    debug!("upload state {state:?} -> {next:?}");
    *state = next;
}
