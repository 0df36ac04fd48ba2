use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::warn;

use crate::config::{
    self, METADATA_RANGE, PLAYLISTS_RANGE, SCHEDULING_RANGE, THUMBNAIL_RANGE, UPLOAD_RANGE,
};

/// Stage of an upload a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uploading,
    SettingMetadata,
    Thumbnail,
    Playlists,
    Scheduling,
    Done,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Uploading => "uploading",
            Phase::SettingMetadata => "setting_metadata",
            Phase::Thumbnail => "thumbnail",
            Phase::Playlists => "playlists",
            Phase::Scheduling => "scheduling",
            Phase::Done => "done",
        }
    }

    /// Slice of the overall 0..=100 scale this phase reports into.
    pub fn range(self) -> (u8, u8) {
        match self {
            Phase::Uploading => UPLOAD_RANGE,
            Phase::SettingMetadata => METADATA_RANGE,
            Phase::Thumbnail => THUMBNAIL_RANGE,
            Phase::Playlists => PLAYLISTS_RANGE,
            Phase::Scheduling => SCHEDULING_RANGE,
            Phase::Done => (100, 100),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer for upload progress, supplied by the caller.
///
/// Called synchronously from the uploading thread with a phase and an overall
/// percentage. Within one upload the percentage never decreases and the last
/// call always reports 100.
///
/// Any `FnMut(Phase, u8)` closure is a reporter:
///
/// ```rust
/// use youtube_up::{Phase, ProgressReporter};
///
/// let mut seen = Vec::new();
/// let mut reporter = |phase: Phase, percent: u8| seen.push((phase, percent));
/// reporter.report(Phase::Uploading, 10);
/// assert_eq!(seen, vec![(Phase::Uploading, 10)]);
/// ```
pub trait ProgressReporter {
    fn report(&mut self, phase: Phase, percent: u8);
}

impl<F: FnMut(Phase, u8)> ProgressReporter for F {
    fn report(&mut self, phase: Phase, percent: u8) {
        self(phase, percent)
    }
}

/// A reporter that ignores every event.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&mut self, _phase: Phase, _percent: u8) {}
}

/// Wraps the caller's reporter for the duration of one upload.
///
/// Keeps the reported percentage monotonic and contains panics raised by the
/// reporter: after the first panic the reporter is muted and the upload goes on.
pub struct ProgressTracker<'a> {
    sink: &'a mut dyn ProgressReporter,
    last: Option<(Phase, u8)>,
    muted: bool,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a mut dyn ProgressReporter) -> Self {
        Self {
            sink,
            last: None,
            muted: false,
        }
    }

    /// Highest percentage reported so far.
    pub fn percent(&self) -> u8 {
        self.last.map(|(_, p)| p).unwrap_or(0)
    }

    pub fn report(&mut self, phase: Phase, percent: u8) {
        let percent = percent.min(100).max(self.percent());
        if self.last == Some((phase, percent)) {
            return;
        }
        self.last = Some((phase, percent));
        if self.muted {
            return;
        }
        let sink = &mut *self.sink;
        if panic::catch_unwind(AssertUnwindSafe(|| sink.report(phase, percent))).is_err() {
            warn!("progress reporter panicked during {phase}; further progress events suppressed");
            self.muted = true;
        }
    }

    /// Report `fraction` (0.0..=1.0) of `phase` done.
    pub fn advance(&mut self, phase: Phase, fraction: f64) {
        self.report(phase, config::scale_into(phase.range(), fraction));
    }

    /// Report `phase` as finished, whether it did any work or not.
    pub fn complete(&mut self, phase: Phase) {
        self.report(phase, phase.range().1);
    }

    /// The final 100% event.
    pub fn finish(&mut self) {
        self.report(Phase::Done, 100);
    }
}
