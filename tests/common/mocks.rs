use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use youtube_up::cookies::Session;
use youtube_up::metadata::Privacy;
use youtube_up::studio::{
    InitialVideo, MetadataUpdate, Schedule, StudioApi, StudioContext, UploadSlot,
};
use youtube_up::ApiError;

/// What a scripted chunk fault does when the chunk at its offset arrives.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum ChunkFault {
    /// Drop the connection before anything lands.
    Drop,
    /// Keep the first `keep` bytes, then drop the connection.
    PartialThenDrop { keep: usize },
    /// Keep the first `keep` bytes and acknowledge only those.
    ShortAck { keep: usize },
    /// Refuse the chunk outright.
    Reject,
}

/// A chunk request as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkAttempt {
    pub resource_id: String,
    pub offset: u64,
    pub len: usize,
    pub finalize: bool,
}

#[derive(Debug, Default)]
pub struct SlotState {
    pub declared_size: u64,
    pub bytes: Vec<u8>,
    pub finalized: bool,
}

#[derive(Debug, Clone)]
pub struct VideoState {
    pub resource_id: String,
    pub initial: InitialVideo,
    pub updates: Vec<MetadataUpdate>,
}

impl VideoState {
    /// Current attributes: initial values overlaid with every applied update.
    pub fn merged(&self) -> MetadataUpdate {
        let mut m = MetadataUpdate {
            title: Some(self.initial.title.clone()),
            description: Some(self.initial.description.clone()),
            privacy: Some(self.initial.privacy),
            ..Default::default()
        };
        for u in &self.updates {
            macro_rules! overlay {
                ($($field:ident),*) => {
                    $(if u.$field.is_some() { m.$field = u.$field.clone(); })*
                };
            }
            overlay!(
                title,
                description,
                privacy,
                tags,
                category,
                license,
                made_for_kids,
                restricted_to_over_18,
                allow_comments,
                comment_mode,
                comment_sort_order,
                can_view_ratings,
                allow_embedding,
                publish_to_feed,
                auto_chapter,
                auto_places,
                auto_concepts,
                has_product_placement,
                show_product_placement_overlay,
                recorded_date,
                audio_language,
                thumbnail_resource_id,
                schedule
            );
            m.add_to_playlists.extend(u.add_to_playlists.iter().cloned());
        }
        m
    }

    /// Privacy the video would have right now, as the host sees it.
    pub fn effective_privacy(&self) -> Privacy {
        let merged = self.merged();
        match merged.schedule {
            Some(Schedule::Premiere { .. }) => Privacy::Public,
            _ => merged.privacy.unwrap_or(Privacy::Private),
        }
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    pub calls: usize,
    pub bootstraps: usize,
    pub slots: HashMap<String, SlotState>,
    pub chunk_attempts: Vec<ChunkAttempt>,
    pub queries: usize,
    pub videos: HashMap<String, VideoState>,
    pub chunk_faults: VecDeque<(u64, ChunkFault)>,
    pub start_failures: u32,
    pub bootstrap_rejected: bool,
    pub metadata_rejection: Option<String>,
    pub metadata_transient_failures: u32,
    pub failing_playlists: HashSet<String>,
    pub fail_thumbnail_attach: bool,
    pub fail_schedule: bool,
    /// Errors returned by the next `create_video` calls. A server error is
    /// answered before anything is created; any other error stands for a
    /// response lost after the video was created.
    pub create_video_faults: VecDeque<ApiError>,
    pub create_video_calls: usize,
}

/// In-memory host that assembles uploaded bytes and records metadata updates.
///
/// Chunks must arrive at exactly the offset the slot has reached, so any gap
/// or overlap in what the client sends fails loudly.
#[derive(Default)]
pub struct MockStudio {
    pub state: Mutex<MockState>,
}

#[allow(dead_code)]
impl MockStudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    /// Queue a fault for the next chunk that starts at `offset`.
    pub fn fault_at(&self, offset: u64, fault: ChunkFault) {
        self.with(|s| s.chunk_faults.push_back((offset, fault)));
    }

    pub fn calls(&self) -> usize {
        self.with(|s| s.calls)
    }

    pub fn attempts_at(&self, offset: u64) -> usize {
        self.with(|s| s.chunk_attempts.iter().filter(|a| a.offset == offset).count())
    }

    pub fn chunk_attempts(&self) -> Vec<ChunkAttempt> {
        self.with(|s| s.chunk_attempts.clone())
    }

    pub fn slot_bytes(&self, resource_id: &str) -> Vec<u8> {
        self.with(|s| s.slots[resource_id].bytes.clone())
    }

    pub fn video(&self, video_id: &str) -> VideoState {
        self.with(|s| s.videos[video_id].clone())
    }

    pub fn video_bytes(&self, video_id: &str) -> Vec<u8> {
        self.with(|s| {
            let resource = &s.videos[video_id].resource_id;
            s.slots[resource].bytes.clone()
        })
    }
}

fn take_fault(state: &mut MockState, offset: u64) -> Option<ChunkFault> {
    let pos = state.chunk_faults.iter().position(|(o, _)| *o == offset)?;
    state.chunk_faults.remove(pos).map(|(_, f)| f)
}

impl StudioApi for MockStudio {
    fn bootstrap(&self, _session: &Session) -> Result<StudioContext, ApiError> {
        self.with(|s| {
            s.calls += 1;
            s.bootstraps += 1;
            if s.bootstrap_rejected {
                return Err(ApiError::Rejected {
                    status: 401,
                    reason: "not signed in".into(),
                });
            }
            Ok(StudioContext {
                api_key: "test-key".into(),
                channel_id: "UCtest".into(),
                delegated_session_id: None,
                client_version: "1.0".into(),
            })
        })
    }

    fn start_upload(
        &self,
        _session: &Session,
        _file_name: &str,
        size: u64,
        _frontend_upload_id: &str,
    ) -> Result<UploadSlot, ApiError> {
        self.with(|s| {
            s.calls += 1;
            if s.start_failures > 0 {
                s.start_failures -= 1;
                return Err(ApiError::Server {
                    status: 503,
                    body: "try later".into(),
                });
            }
            let resource_id = format!("res-{}", s.slots.len() + 1);
            s.slots.insert(
                resource_id.clone(),
                SlotState {
                    declared_size: size,
                    ..Default::default()
                },
            );
            Ok(UploadSlot {
                upload_url: format!("mock://upload/{resource_id}"),
                resource_id,
            })
        })
    }

    fn upload_chunk(
        &self,
        _session: &Session,
        slot: &UploadSlot,
        offset: u64,
        data: &[u8],
        finalize: bool,
    ) -> Result<u64, ApiError> {
        self.with(|s| {
            s.calls += 1;
            s.chunk_attempts.push(ChunkAttempt {
                resource_id: slot.resource_id.clone(),
                offset,
                len: data.len(),
                finalize,
            });
            let fault = take_fault(s, offset);
            let target = s
                .slots
                .get_mut(&slot.resource_id)
                .ok_or_else(|| ApiError::Rejected {
                    status: 404,
                    reason: "unknown slot".into(),
                })?;

            if target.finalized {
                return Err(ApiError::Rejected {
                    status: 400,
                    reason: "slot already finalized".into(),
                });
            }
            if offset != target.bytes.len() as u64 {
                return Err(ApiError::Rejected {
                    status: 400,
                    reason: format!("offset {offset} but holding {}", target.bytes.len()),
                });
            }

            match fault {
                Some(ChunkFault::Drop) => Err(ApiError::Network("connection reset".into())),
                Some(ChunkFault::PartialThenDrop { keep }) => {
                    target.bytes.extend_from_slice(&data[..keep.min(data.len())]);
                    Err(ApiError::Network("connection reset mid-chunk".into()))
                }
                Some(ChunkFault::ShortAck { keep }) => {
                    let keep = keep.min(data.len());
                    target.bytes.extend_from_slice(&data[..keep]);
                    Ok(offset + keep as u64)
                }
                Some(ChunkFault::Reject) => Err(ApiError::Rejected {
                    status: 400,
                    reason: "chunk refused".into(),
                }),
                None => {
                    target.bytes.extend_from_slice(data);
                    if finalize {
                        target.finalized = true;
                    }
                    Ok(target.bytes.len() as u64)
                }
            }
        })
    }

    fn query_offset(&self, _session: &Session, slot: &UploadSlot) -> Result<u64, ApiError> {
        self.with(|s| {
            s.calls += 1;
            s.queries += 1;
            Ok(s.slots[&slot.resource_id].bytes.len() as u64)
        })
    }

    fn create_video(
        &self,
        _session: &Session,
        _context: &StudioContext,
        slot: &UploadSlot,
        initial: &InitialVideo,
    ) -> Result<String, ApiError> {
        self.with(|s| {
            s.calls += 1;
            s.create_video_calls += 1;
            let fault = s.create_video_faults.pop_front();
            if let Some(e @ ApiError::Server { .. }) = fault {
                return Err(e);
            }
            let target = &s.slots[&slot.resource_id];
            if !target.finalized || target.bytes.len() as u64 != target.declared_size {
                return Err(ApiError::Protocol(format!(
                    "slot incomplete: {} of {} bytes",
                    target.bytes.len(),
                    target.declared_size
                )));
            }
            let video_id = format!("vid-{}", s.videos.len() + 1);
            s.videos.insert(
                video_id.clone(),
                VideoState {
                    resource_id: slot.resource_id.clone(),
                    initial: initial.clone(),
                    updates: Vec::new(),
                },
            );
            match fault {
                Some(e) => Err(e),
                None => Ok(video_id),
            }
        })
    }

    fn update_metadata(
        &self,
        _session: &Session,
        _context: &StudioContext,
        video_id: &str,
        update: &MetadataUpdate,
    ) -> Result<(), ApiError> {
        self.with(|s| {
            s.calls += 1;
            if update.title.is_some() {
                if let Some(reason) = &s.metadata_rejection {
                    return Err(ApiError::Rejected {
                        status: 400,
                        reason: reason.clone(),
                    });
                }
                if s.metadata_transient_failures > 0 {
                    s.metadata_transient_failures -= 1;
                    return Err(ApiError::Server {
                        status: 500,
                        body: "backend error".into(),
                    });
                }
            }
            if update.thumbnail_resource_id.is_some() && s.fail_thumbnail_attach {
                return Err(ApiError::Rejected {
                    status: 400,
                    reason: "thumbnail too large".into(),
                });
            }
            if update
                .add_to_playlists
                .iter()
                .any(|p| s.failing_playlists.contains(p))
            {
                return Err(ApiError::Rejected {
                    status: 404,
                    reason: "playlist not found".into(),
                });
            }
            if update.schedule.is_some() && s.fail_schedule {
                return Err(ApiError::Rejected {
                    status: 400,
                    reason: "schedule time in the past".into(),
                });
            }
            let video = s.videos.get_mut(video_id).ok_or_else(|| ApiError::Rejected {
                status: 404,
                reason: "unknown video".into(),
            })?;
            video.updates.push(update.clone());
            Ok(())
        })
    }
}
