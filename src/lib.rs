//! Capture-to-PDF compression for scanned hospital documents.
//!
//! An ordered set of camera captures becomes one A4 PDF whose size is kept
//! under a byte budget: a quality plan picked from the page count, batched
//! encoding over a fallback chain, page assembly in capture order, and at
//! most one emergency re-encode when the first result is too large.

pub mod capture;
pub mod config;
pub mod encode;
pub mod error;
pub mod handoff;
pub mod pdf;
pub mod pipeline;
pub mod plan;

pub use capture::{CaptureBuffer, CapturedImage};
pub use error::{EncodeError, Result, ScanPdfError};
pub use handoff::{DocumentMetadata, HandoffDocument, UploadSubmitter};
pub use pipeline::{GovernedDocument, SizeGovernor};
pub use plan::{EncodingPlan, plan_for};
