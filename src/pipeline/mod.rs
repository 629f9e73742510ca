pub mod background;
pub mod context;
pub mod dispatcher;
pub mod governor;
pub mod job_runner;
pub mod orchestrator;

pub use background::{RunHandle, spawn_run};
pub use context::{PipelineContext, Stage};
pub use dispatcher::{DispatchOutcome, EncodeDispatcher};
pub use governor::{GovernedDocument, SizeGovernor};
