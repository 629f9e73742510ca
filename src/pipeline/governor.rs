// Size governor: plan -> encode -> assemble -> size check (+ one emergency pass)

use std::time::Duration;

use tracing::{info, warn};

use crate::capture::CapturedImage;
use crate::config::merged::MergedConfig;
use crate::encode::EncoderChain;
use crate::error::ScanPdfError;
use crate::pdf::{AssembledDocument, assemble};
use crate::pipeline::context::{PipelineContext, Stage};
use crate::pipeline::dispatcher::EncodeDispatcher;
use crate::plan::{EncodingPlan, emergency_plan, plan_for};

/// The document a run ends with, and how it got there.
#[derive(Debug, Clone)]
pub struct GovernedDocument {
    pub document: AssembledDocument,
    pub context: PipelineContext,
}

impl GovernedDocument {
    pub fn emergency_pass_used(&self) -> bool {
        self.context.emergency_triggered()
    }

    pub fn over_budget(&self) -> bool {
        self.context.over_budget()
    }
}

/// Owns the dispatcher and the budget; one governor can serve many runs.
pub struct SizeGovernor {
    dispatcher: EncodeDispatcher,
    size_budget_bytes: u64,
    emergency: EncodingPlan,
}

impl SizeGovernor {
    /// Governor with the standard offload → accelerated → canvas chain.
    pub fn new(config: &MergedConfig) -> crate::error::Result<Self> {
        if config.offload_workers > 0 && config.offload_timeout_ms == 0 {
            return Err(ScanPdfError::config(
                "offload_timeout_ms must be positive while offload workers are enabled",
            ));
        }
        let chain = EncoderChain::standard(
            config.offload_workers,
            Duration::from_millis(config.offload_timeout_ms),
        );
        Self::with_chain(config, chain)
    }

    pub fn with_chain(config: &MergedConfig, chain: EncoderChain) -> crate::error::Result<Self> {
        if config.size_budget_bytes == 0 {
            return Err(ScanPdfError::config("size_budget_bytes must be positive"));
        }
        let emergency = emergency_plan(config.emergency_max_width, config.emergency_quality);
        if !emergency.is_valid() {
            return Err(ScanPdfError::config(format!(
                "invalid emergency settings: width {}, quality {}",
                config.emergency_max_width, config.emergency_quality
            )));
        }
        Ok(Self {
            dispatcher: EncodeDispatcher::new(chain, config.batch_size)?,
            size_budget_bytes: config.size_budget_bytes,
            emergency,
        })
    }

    pub fn size_budget_bytes(&self) -> u64 {
        self.size_budget_bytes
    }

    pub fn emergency_plan(&self) -> &EncodingPlan {
        &self.emergency
    }

    pub fn run(&self, images: &[CapturedImage]) -> crate::error::Result<GovernedDocument> {
        self.run_titled(images, None)
    }

    /// Run the whole pipeline; `title` goes into the PDF info dictionary.
    ///
    /// Always ends with a document unless there are no images or a page
    /// cannot be assembled. An over-budget first pass gets exactly one
    /// emergency re-encode of the original captures, and that result is
    /// returned whatever its size.
    pub fn run_titled(
        &self,
        images: &[CapturedImage],
        title: Option<&str>,
    ) -> crate::error::Result<GovernedDocument> {
        if images.is_empty() {
            return Err(ScanPdfError::CaptureUnavailable);
        }

        let ctx = PipelineContext::new(images.len(), self.size_budget_bytes).advance(Stage::Planning);
        let plan = plan_for(images.len() as u32);
        info!(
            images = images.len(),
            quality = plan.quality,
            max_width = plan.max_width,
            max_height = plan.max_height,
            "encoding plan"
        );
        let ctx = ctx.with_plan(plan).advance(Stage::Encoding);

        let (document, ctx) = self.pass(images, &plan, title, ctx, Stage::Assembling)?;
        let ctx = ctx.advance(Stage::SizeCheck);

        if document.total_size_bytes <= self.size_budget_bytes {
            return Ok(GovernedDocument {
                document,
                context: ctx.advance(Stage::Done),
            });
        }

        warn!(
            size = document.total_size_bytes,
            budget = self.size_budget_bytes,
            "document over budget, running emergency pass"
        );
        // Re-encode from the originals, not the already degraded pages.
        drop(document);
        let plan = self.emergency;
        let ctx = ctx.with_plan(plan).advance(Stage::EmergencyEncoding);
        let (document, ctx) = self.pass(images, &plan, title, ctx, Stage::EmergencyAssembling)?;

        if document.total_size_bytes > self.size_budget_bytes {
            warn!(
                size = document.total_size_bytes,
                budget = self.size_budget_bytes,
                "document still over budget after emergency pass"
            );
        }
        Ok(GovernedDocument {
            document,
            context: ctx.advance(Stage::Done),
        })
    }

    fn pass(
        &self,
        images: &[CapturedImage],
        plan: &EncodingPlan,
        title: Option<&str>,
        ctx: PipelineContext,
        assembling: Stage,
    ) -> crate::error::Result<(AssembledDocument, PipelineContext)> {
        let outcome = self.dispatcher.encode(images, plan);
        let ctx = ctx.advance(assembling);
        let document = assemble(outcome.pages, title)?;
        let degraded = document.degraded_pages();
        let ctx = ctx.record_pass(document.total_size_bytes, degraded);
        Ok((document, ctx))
    }
}
