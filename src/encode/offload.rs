// Tier 1: worker pool offload
//
// Jobs go over a bounded crossbeam channel to dedicated encode threads. Each
// job carries its own one-shot reply channel and its sequence index; a reply
// is only accepted if the index matches the job that is waiting for it.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use tracing::{debug, warn};

use crate::capture::CapturedImage;
use crate::encode::raster::{ResizeMode, encode_fitted};
use crate::encode::{EncodedPage, PageEncoder};
use crate::error::EncodeError;
use crate::plan::EncodingPlan;

const ENCODER_NAME: &str = "offload";

struct OffloadJob {
    image: CapturedImage,
    plan: EncodingPlan,
    reply: Sender<OffloadReply>,
}

struct OffloadReply {
    sequence_index: u32,
    result: Result<EncodedPage, EncodeError>,
}

/// Dedicated encode threads fed through a bounded job queue.
///
/// A pool started with zero workers reports every job as unavailable, which
/// sends the dispatcher straight to the in-process tiers.
pub struct OffloadPool {
    jobs: Option<Sender<OffloadJob>>,
    workers: Vec<JoinHandle<()>>,
    timeout: Duration,
}

impl OffloadPool {
    pub fn start(worker_count: usize, timeout: Duration) -> Self {
        if worker_count == 0 {
            return Self::disabled();
        }

        let (tx, rx) = crossbeam_channel::bounded::<OffloadJob>(worker_count * 2);
        let mut workers = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let rx = rx.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("scan-pdf-offload-{i}"))
                .spawn(move || worker_loop(rx));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => warn!(worker = i, error = %e, "failed to spawn offload worker"),
            }
        }

        if workers.is_empty() {
            return Self::disabled();
        }
        debug!(workers = workers.len(), "offload pool started");

        Self {
            jobs: Some(tx),
            workers,
            timeout,
        }
    }

    pub fn disabled() -> Self {
        Self {
            jobs: None,
            workers: Vec::new(),
            timeout: Duration::ZERO,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn is_available(&self) -> bool {
        self.jobs.is_some()
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis().min(u64::MAX as u128) as u64
    }
}

fn worker_loop(rx: Receiver<OffloadJob>) {
    for job in rx.iter() {
        let sequence_index = job.image.sequence_index;
        let result = catch_unwind(AssertUnwindSafe(|| {
            encode_fitted(
                &job.image,
                &job.plan,
                ResizeMode::Filtered(job.plan.resample.filter()),
                ENCODER_NAME,
            )
        }))
        .unwrap_or_else(|_| {
            Err(EncodeError::Offload(format!(
                "worker panicked on image {sequence_index}"
            )))
        });

        // 待機側がタイムアウト済みなら受信者は存在しない
        let _ = job.reply.send(OffloadReply {
            sequence_index,
            result,
        });
    }
}

impl PageEncoder for OffloadPool {
    fn name(&self) -> &'static str {
        ENCODER_NAME
    }

    fn encode(&self, image: &CapturedImage, plan: &EncodingPlan) -> Result<EncodedPage, EncodeError> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| EncodeError::Unavailable("offload pool has no workers".into()))?;

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let job = OffloadJob {
            image: image.clone(),
            plan: *plan,
            reply: reply_tx,
        };

        match jobs.send_timeout(job, self.timeout) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => return Err(EncodeError::Timeout(self.timeout_ms())),
            Err(SendTimeoutError::Disconnected(_)) => {
                return Err(EncodeError::Unavailable("offload pool shut down".into()));
            }
        }

        match reply_rx.recv_timeout(self.timeout) {
            Ok(reply) if reply.sequence_index == image.sequence_index => reply.result,
            Ok(reply) => Err(EncodeError::Offload(format!(
                "reply for image {} delivered to job {}",
                reply.sequence_index, image.sequence_index
            ))),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    index = image.sequence_index,
                    timeout_ms = self.timeout_ms(),
                    "offload job timed out"
                );
                Err(EncodeError::Timeout(self.timeout_ms()))
            }
            Err(RecvTimeoutError::Disconnected) => Err(EncodeError::Offload(format!(
                "worker exited without replying for image {}",
                image.sequence_index
            ))),
        }
    }
}

impl Drop for OffloadPool {
    fn drop(&mut self) {
        // Closing the queue ends every worker loop once it drains.
        self.jobs.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
