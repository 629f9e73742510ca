// Encode dispatcher: batched fan-out over the fallback chain

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::capture::CapturedImage;
use crate::encode::{EncodedPage, EncoderChain};
use crate::error::ScanPdfError;
use crate::plan::EncodingPlan;

/// Jobs in flight per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Pages of one encode pass, in input order.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub pages: Vec<EncodedPage>,
    /// Sequence indices whose every tier failed.
    pub degraded: Vec<u32>,
}

/// Runs one encode job per capture, at most `batch_size` at a time.
///
/// Batches run back to back: batch N starts only after every job of batch
/// N-1 has resolved. Results are slotted by the job's input position, never
/// by completion order.
pub struct EncodeDispatcher {
    chain: EncoderChain,
    batch_size: usize,
    pool: rayon::ThreadPool,
}

impl EncodeDispatcher {
    pub fn new(chain: EncoderChain, batch_size: usize) -> crate::error::Result<Self> {
        if batch_size == 0 {
            return Err(ScanPdfError::config("batch_size must be at least 1"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(batch_size)
            .thread_name(|i| format!("scan-pdf-batch-{i}"))
            .build()
            .map_err(|e| ScanPdfError::config(format!("failed to build encode pool: {e}")))?;
        Ok(Self {
            chain,
            batch_size,
            pool,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn chain(&self) -> &EncoderChain {
        &self.chain
    }

    /// Encode every capture. Never fails: an image that no tier can handle
    /// is passed through with its original bytes.
    pub fn encode(&self, images: &[CapturedImage], plan: &EncodingPlan) -> DispatchOutcome {
        let mut slots: Vec<Option<EncodedPage>> = vec![None; images.len()];

        for (batch_no, batch) in images.chunks(self.batch_size).enumerate() {
            let offset = batch_no * self.batch_size;
            let results: Vec<(usize, EncodedPage)> = self.pool.install(|| {
                batch
                    .par_iter()
                    .enumerate()
                    .map(|(i, image)| (offset + i, self.encode_one(image, plan)))
                    .collect()
            });
            for (position, page) in results {
                slots[position] = Some(page);
            }
            debug!(batch = batch_no, jobs = batch.len(), "batch resolved");

            std::thread::yield_now();
        }

        let pages: Vec<EncodedPage> = slots
            .into_iter()
            .zip(images)
            .map(|(slot, image)| slot.unwrap_or_else(|| EncodedPage::passthrough(image)))
            .collect();
        let degraded = pages
            .iter()
            .filter(|p| p.degraded)
            .map(|p| p.sequence_index)
            .collect();

        DispatchOutcome { pages, degraded }
    }

    fn encode_one(&self, image: &CapturedImage, plan: &EncodingPlan) -> EncodedPage {
        match self.chain.encode(image, plan) {
            Ok(page) => page,
            Err(failures) => {
                let reasons: Vec<String> = failures
                    .iter()
                    .map(|(tier, e)| format!("{tier}: {e}"))
                    .collect();
                warn!(
                    index = image.sequence_index,
                    reasons = %reasons.join("; "),
                    "all encode tiers failed, keeping original bytes"
                );
                EncodedPage::passthrough(image)
            }
        }
    }
}
