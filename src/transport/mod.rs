//! Resumable chunked transfer of a local file into a remote upload slot.

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::chunker::ChunkReader;
use crate::error::{ApiError, UploadError};
use crate::retry::{with_retry, with_retry_when, Backoff};
use crate::studio::{InitialVideo, StudioApi, StudioClient, UploadSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    InProgress,
    Committed,
    Failed,
}

/// One file moving into one upload slot.
#[derive(Debug)]
pub struct UploadJob {
    path: PathBuf,
    size: u64,
    slot: UploadSlot,
    frontend_upload_id: String,
    offset: u64,
    status: JobStatus,
}

impl UploadJob {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn slot(&self) -> &UploadSlot {
        &self.slot
    }

    pub fn frontend_upload_id(&self) -> &str {
        &self.frontend_upload_id
    }

    /// Bytes the server has acknowledged.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.offset >= self.size
    }
}

/// Drives the host's resumable upload protocol for one file at a time.
pub struct ResumableTransport<'c, 'a, A: StudioApi> {
    client: &'c StudioClient<'a, A>,
    chunk_size: usize,
}

impl<'c, 'a, A: StudioApi> ResumableTransport<'c, 'a, A> {
    pub fn new(client: &'c StudioClient<'a, A>, chunk_size: usize) -> Self {
        Self {
            client,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Request an upload slot for `path`.
    pub fn begin(&self, path: &Path) -> Result<UploadJob, UploadError> {
        let size = std::fs::metadata(path)?.len();
        if size == 0 {
            return Err(UploadError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is empty", path.display()),
            )));
        }
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let frontend_upload_id = format!("innertube_studio:{}:0", Uuid::new_v4());

        let slot = with_retry(self.client.retry, "upload slot request", || {
            self.client
                .api
                .start_upload(self.client.session, &file_name, size, &frontend_upload_id)
        })
        .map_err(|(e, _)| UploadError::UploadInit(e))?;

        debug!("opened upload slot {} for {}", slot.resource_id, path.display());
        Ok(UploadJob {
            path: path.to_path_buf(),
            size,
            slot,
            frontend_upload_id,
            offset: 0,
            status: JobStatus::Pending,
        })
    }

    /// Send one chunk starting at `offset`, retrying transient failures.
    ///
    /// Returns the offset the server acknowledges. On success that is
    /// `offset + data.len()`; anything smaller means the server kept only part
    /// of the chunk and the caller must resend from the returned offset. After a
    /// transient failure the server is asked where it stands before retrying,
    /// so a partially received chunk is resumed rather than duplicated.
    pub fn send_chunk(
        &self,
        job: &mut UploadJob,
        offset: u64,
        data: &[u8],
    ) -> Result<u64, UploadError> {
        let end = offset + data.len() as u64;
        let finalize = end >= job.size;
        let mut backoff = Backoff::new(self.client.retry);
        job.status = JobStatus::InProgress;

        loop {
            let result = self.client.api.upload_chunk(
                self.client.session,
                &job.slot,
                offset,
                data,
                finalize,
            );
            let err = match result {
                Ok(ack) if ack >= offset && ack <= end => {
                    if ack < end {
                        warn!("server kept {} of {} bytes at {offset}", ack - offset, data.len());
                    }
                    job.offset = ack;
                    return Ok(ack);
                }
                Ok(ack) => ApiError::Protocol(format!(
                    "server acknowledged byte {ack} for a chunk spanning {offset}..{end}"
                )),
                Err(e) => e,
            };

            if !err.is_transient() || backoff.is_exhausted() {
                job.status = JobStatus::Failed;
                return Err(UploadError::UploadTransport {
                    offset,
                    attempts: backoff.attempts() + 1,
                    source: err,
                });
            }

            let delay = backoff.next_delay();
            warn!(
                "chunk at {offset} failed (attempt {}): {err}; retrying in {delay:?}",
                backoff.attempts()
            );
            std::thread::sleep(delay);

            if let Some(server_offset) = self.query_offset(job) {
                if server_offset != offset {
                    if server_offset > end {
                        job.status = JobStatus::Failed;
                        return Err(UploadError::UploadTransport {
                            offset,
                            attempts: backoff.attempts(),
                            source: ApiError::Protocol(format!(
                                "server reports {server_offset} bytes, past the chunk end {end}"
                            )),
                        });
                    }
                    info!("resuming from server offset {server_offset} instead of {offset}");
                    job.offset = server_offset;
                    return Ok(server_offset);
                }
            }
        }
    }

    /// Where the server stands on `job`; `None` if it cannot be asked right now.
    fn query_offset(&self, job: &UploadJob) -> Option<u64> {
        match self
            .client
            .api
            .query_offset(self.client.session, &job.slot)
        {
            Ok(n) => Some(n),
            Err(e) => {
                debug!("offset query failed: {e}");
                None
            }
        }
    }

    /// Send every remaining byte of `job`, calling `on_progress(acked, total)`
    /// after each acknowledged chunk.
    pub fn transfer(
        &self,
        job: &mut UploadJob,
        mut on_progress: impl FnMut(u64, u64),
    ) -> Result<(), UploadError> {
        let mut reader = ChunkReader::open(&job.path, self.chunk_size)?;
        if reader.len() != job.size {
            job.status = JobStatus::Failed;
            return Err(UploadError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} changed size since the slot was opened", job.path.display()),
            )));
        }

        debug!(
            "sending {} bytes of {} in {} chunks",
            job.size - job.offset,
            job.path.display(),
            reader.chunk_count()
        );
        let mut stalls = Backoff::new(self.client.retry);
        while !job.is_complete() {
            let offset = job.offset;
            let chunk = match reader.read_at(offset)? {
                Some(chunk) => chunk,
                None => break,
            };
            if chunk.is_last {
                debug!("final chunk at {}", chunk.offset);
            }
            let acked = self.send_chunk(job, offset, &chunk.data)?;

            if acked > offset {
                stalls.reset();
                on_progress(acked, job.size);
            } else if stalls.is_exhausted() {
                job.status = JobStatus::Failed;
                return Err(UploadError::UploadTransport {
                    offset,
                    attempts: stalls.attempts() + 1,
                    source: ApiError::Protocol("server keeps discarding the chunk".into()),
                });
            } else {
                std::thread::sleep(stalls.next_delay());
            }
        }

        info!("transferred {} bytes of {}", job.size, job.path.display());
        Ok(())
    }

    /// Turn the completed slot into a video and return its id.
    pub fn finalize(&self, job: &mut UploadJob, initial: &InitialVideo) -> Result<String, UploadError> {
        if !job.is_complete() {
            return Err(UploadError::UploadTransport {
                offset: job.offset,
                attempts: 0,
                source: ApiError::Protocol("finalize called before all bytes were acknowledged".into()),
            });
        }
        // Not idempotent: a request lost in flight may still have created the
        // video, so only retry when the host answered with a server error.
        let retryable = |e: &ApiError| matches!(e, ApiError::Server { .. });
        let video_id = with_retry_when(self.client.retry, "create video", retryable, || {
            self.client
                .api
                .create_video(self.client.session, self.client.context, &job.slot, initial)
        })
        .map_err(|(e, attempts)| {
            job.status = JobStatus::Failed;
            UploadError::UploadTransport {
                offset: job.offset,
                attempts,
                source: e,
            }
        })?;
        job.status = JobStatus::Committed;
        Ok(video_id)
    }
}
