pub mod accelerated;
pub mod canvas;
pub mod jpeg;
pub mod offload;
pub mod raster;

use std::time::Duration;

use tracing::debug;

use crate::capture::{CapturedImage, probe_dimensions};
use crate::error::EncodeError;
use crate::plan::EncodingPlan;

pub use accelerated::AcceleratedEncoder;
pub use canvas::CanvasEncoder;
pub use offload::OffloadPool;

/// Name recorded on pages that carry the original capture bytes.
pub const PASSTHROUGH: &str = "passthrough";

/// Container format of an encoded page's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    Jpeg,
    Png,
    Other,
}

impl PageFormat {
    pub fn sniff(bytes: &[u8]) -> Self {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Jpeg) => PageFormat::Jpeg,
            Ok(image::ImageFormat::Png) => PageFormat::Png,
            _ => PageFormat::Other,
        }
    }
}

/// The result of exactly one encode job.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPage {
    pub sequence_index: u32,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
    pub format: PageFormat,
    /// Name of the tier that produced the bytes.
    pub encoder: &'static str,
    /// True when `bytes` are the unmodified capture.
    pub degraded: bool,
}

impl EncodedPage {
    /// Wrap the original capture bytes when every encode tier failed.
    ///
    /// The size budget is not honored for this page.
    pub fn passthrough(image: &CapturedImage) -> Self {
        // ヘッダ上の寸法を優先し、読めない場合のみ申告値を使う
        let (width, height) = probe_dimensions(&image.bytes)
            .unwrap_or((image.native_width, image.native_height));
        Self {
            sequence_index: image.sequence_index,
            bytes: image.bytes.clone(),
            width,
            height,
            size_bytes: image.bytes.len(),
            format: PageFormat::sniff(&image.bytes),
            encoder: PASSTHROUGH,
            degraded: true,
        }
    }
}

/// One way of turning a capture into an encoded page.
pub trait PageEncoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn encode(&self, image: &CapturedImage, plan: &EncodingPlan)
    -> Result<EncodedPage, EncodeError>;
}

/// Ordered fallback tiers. The first tier that succeeds wins.
pub struct EncoderChain {
    tiers: Vec<Box<dyn PageEncoder>>,
}

impl EncoderChain {
    pub fn new(tiers: Vec<Box<dyn PageEncoder>>) -> Self {
        Self { tiers }
    }

    /// Offload pool, then accelerated in-process, then the basic canvas path.
    pub fn standard(offload_workers: usize, offload_timeout: Duration) -> Self {
        Self::new(vec![
            Box::new(OffloadPool::start(offload_workers, offload_timeout)),
            Box::new(AcceleratedEncoder),
            Box::new(CanvasEncoder),
        ])
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    /// Try every tier in order.
    ///
    /// On exhaustion returns each tier's failure, in tier order.
    pub fn encode(
        &self,
        image: &CapturedImage,
        plan: &EncodingPlan,
    ) -> Result<EncodedPage, Vec<(&'static str, EncodeError)>> {
        let mut failures = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            match tier.encode(image, plan) {
                Ok(page) if page.sequence_index == image.sequence_index => {
                    debug!(
                        index = image.sequence_index,
                        tier = tier.name(),
                        size = page.size_bytes,
                        "page encoded"
                    );
                    return Ok(page);
                }
                Ok(page) => failures.push((
                    tier.name(),
                    EncodeError::Offload(format!(
                        "result for image {} returned for job {}",
                        page.sequence_index, image.sequence_index
                    )),
                )),
                Err(e) => {
                    debug!(index = image.sequence_index, tier = tier.name(), error = %e, "tier failed");
                    failures.push((tier.name(), e));
                }
            }
        }
        Err(failures)
    }
}
