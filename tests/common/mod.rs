#![allow(dead_code)]

pub mod mocks;

use std::path::PathBuf;

use youtube_up::cookies::{self, Session};
use youtube_up::studio::StudioContext;
use youtube_up::{Phase, RetryPolicy, UploaderConfig};

pub const COOKIES: &str = "# Netscape HTTP Cookie File\n\
.youtube.com\tTRUE\t/\tTRUE\t1999999999\tSAPISID\tsapisid-value\n\
#HttpOnly_.youtube.com\tTRUE\t/\tTRUE\t1999999999\tSID\tsid-value\n\
.google.com\tTRUE\t/\tTRUE\t1999999999\tHSID\thsid-value\n";

pub fn session() -> Session {
    Session::from_cookies(cookies::parse(COOKIES).unwrap()).unwrap()
}

pub fn context() -> StudioContext {
    StudioContext {
        api_key: "test-key".into(),
        channel_id: "UCtest".into(),
        delegated_session_id: None,
        client_version: "1.0".into(),
    }
}

pub fn config(chunk_size: usize, max_attempts: u32) -> UploaderConfig {
    UploaderConfig {
        chunk_size,
        retry: RetryPolicy::immediate(max_attempts),
        ..Default::default()
    }
}

/// Deterministic, non-repeating test payload.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Write `data` to a uniquely named file under the system temp dir.
pub fn temp_file(name: &str, data: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "youtube_up_{}_{}_{name}",
        std::process::id(),
        uuid::Uuid::new_v4()
    ));
    std::fs::write(&path, data).unwrap();
    path
}

/// Reporter that records every event it receives.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<(Phase, u8)>,
}

impl youtube_up::ProgressReporter for Recorder {
    fn report(&mut self, phase: Phase, percent: u8) {
        self.events.push((phase, percent));
    }
}

impl Recorder {
    pub fn assert_monotonic(&self) {
        for pair in self.events.windows(2) {
            assert!(
                pair[0].1 <= pair[1].1,
                "progress went backwards: {:?} -> {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    pub fn last(&self) -> Option<(Phase, u8)> {
        self.events.last().copied()
    }
}
