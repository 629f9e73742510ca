// Pipeline progress, threaded through a run by value

use tracing::info;

use crate::plan::EncodingPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Planning,
    Encoding,
    Assembling,
    SizeCheck,
    EmergencyEncoding,
    EmergencyAssembling,
    Done,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Planning => "planning",
            Stage::Encoding => "encoding pages",
            Stage::Assembling => "assembling document",
            Stage::SizeCheck => "checking size",
            Stage::EmergencyEncoding => "re-encoding pages",
            Stage::EmergencyAssembling => "re-assembling document",
            Stage::Done => "done",
        }
    }

    /// Rough completion percentage shown while this stage runs.
    pub fn progress_percent(self) -> u8 {
        match self {
            Stage::Idle => 0,
            Stage::Planning => 5,
            Stage::Encoding => 10,
            Stage::Assembling => 60,
            Stage::SizeCheck => 80,
            Stage::EmergencyEncoding => 85,
            Stage::EmergencyAssembling => 95,
            Stage::Done => 100,
        }
    }

    /// Whether `next` may directly follow `self`.
    pub fn can_advance_to(self, next: Stage) -> bool {
        matches!(
            (self, next),
            (Stage::Idle, Stage::Planning)
                | (Stage::Planning, Stage::Encoding)
                | (Stage::Encoding, Stage::Assembling)
                | (Stage::Assembling, Stage::SizeCheck)
                | (Stage::SizeCheck, Stage::Done)
                | (Stage::SizeCheck, Stage::EmergencyEncoding)
                | (Stage::EmergencyEncoding, Stage::EmergencyAssembling)
                | (Stage::EmergencyAssembling, Stage::Done)
        )
    }
}

/// Everything the run has learned so far. Each stage takes the context and
/// hands back an updated one.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineContext {
    pub stage: Stage,
    /// Every stage entered, in order, starting with `Idle`.
    pub trail: Vec<Stage>,
    pub image_count: usize,
    pub size_budget_bytes: u64,
    pub plan: Option<EncodingPlan>,
    /// Number of encode passes run (1 or 2).
    pub passes: u32,
    pub first_pass_size: Option<u64>,
    pub final_size: Option<u64>,
    /// Sequence indices carried with original bytes in the final document.
    pub degraded_pages: Vec<u32>,
}

impl PipelineContext {
    pub fn new(image_count: usize, size_budget_bytes: u64) -> Self {
        Self {
            stage: Stage::Idle,
            trail: vec![Stage::Idle],
            image_count,
            size_budget_bytes,
            plan: None,
            passes: 0,
            first_pass_size: None,
            final_size: None,
            degraded_pages: Vec::new(),
        }
    }

    pub fn advance(mut self, next: Stage) -> Self {
        debug_assert!(
            self.stage.can_advance_to(next),
            "invalid stage transition {:?} -> {:?}",
            self.stage,
            next
        );
        info!(
            stage = next.label(),
            progress = next.progress_percent(),
            images = self.image_count,
            "pipeline stage"
        );
        self.stage = next;
        self.trail.push(next);
        self
    }

    pub fn with_plan(mut self, plan: EncodingPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    /// Record the outcome of one encode+assemble pass.
    pub fn record_pass(mut self, size_bytes: u64, degraded_pages: Vec<u32>) -> Self {
        self.passes += 1;
        if self.first_pass_size.is_none() {
            self.first_pass_size = Some(size_bytes);
        }
        self.final_size = Some(size_bytes);
        self.degraded_pages = degraded_pages;
        self
    }

    pub fn progress_percent(&self) -> u8 {
        self.stage.progress_percent()
    }

    pub fn emergency_triggered(&self) -> bool {
        self.passes > 1
    }

    /// True when the final document is still larger than the budget.
    pub fn over_budget(&self) -> bool {
        self.final_size
            .is_some_and(|size| size > self.size_budget_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_allowed() {
        let ctx = PipelineContext::new(2, 100)
            .advance(Stage::Planning)
            .advance(Stage::Encoding)
            .advance(Stage::Assembling)
            .advance(Stage::SizeCheck)
            .advance(Stage::Done);
        assert_eq!(ctx.trail.len(), 6);
        assert_eq!(ctx.progress_percent(), 100);
    }

    #[test]
    fn emergency_only_follows_size_check() {
        assert!(Stage::SizeCheck.can_advance_to(Stage::EmergencyEncoding));
        assert!(!Stage::Assembling.can_advance_to(Stage::EmergencyEncoding));
        assert!(!Stage::EmergencyAssembling.can_advance_to(Stage::EmergencyEncoding));
        assert!(!Stage::Done.can_advance_to(Stage::Planning));
    }

    #[test]
    fn record_pass_keeps_first_size() {
        let ctx = PipelineContext::new(1, 100)
            .record_pass(500, vec![])
            .record_pass(150, vec![0]);
        assert_eq!(ctx.passes, 2);
        assert_eq!(ctx.first_pass_size, Some(500));
        assert_eq!(ctx.final_size, Some(150));
        assert_eq!(ctx.degraded_pages, vec![0]);
        assert!(ctx.emergency_triggered());
        assert!(ctx.over_budget());
    }
}
