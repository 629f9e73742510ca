// Document handoff: final PDF + metadata -> external upload collaborator

pub mod directory;

use serde::Serialize;

use crate::pipeline::governor::GovernedDocument;

pub use directory::DirectorySubmitter;

pub const PDF_MIME: &str = "application/pdf";

/// Fields the upload side needs alongside the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub patient_identifier: String,
    pub display_file_name: String,
}

impl DocumentMetadata {
    /// Build metadata with a sanitised file name.
    ///
    /// A missing or blank name becomes `scan-<patient_identifier>.pdf`.
    pub fn new(patient_identifier: impl Into<String>, display_file_name: Option<&str>) -> Self {
        let patient_identifier = patient_identifier.into();
        let display_file_name = match display_file_name.map(str::trim) {
            Some(name) if !name.is_empty() => sanitize_file_name(name),
            _ => sanitize_file_name(&format!("scan-{patient_identifier}")),
        };
        Self {
            patient_identifier,
            display_file_name,
        }
    }
}

/// Replace path separators and control characters, and make sure the name
/// ends in `.pdf`.
pub fn sanitize_file_name(name: &str) -> String {
    let mut cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    // 先頭のドットは隠しファイル扱いになるため除去
    while cleaned.starts_with('.') {
        cleaned.remove(0);
    }
    if cleaned.is_empty() {
        cleaned.push_str("scan");
    }
    if !cleaned.to_ascii_lowercase().ends_with(".pdf") {
        cleaned.push_str(".pdf");
    }
    cleaned
}

/// Per-run summary that travels with the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub page_count: usize,
    pub passes: u32,
    pub emergency_pass: bool,
    pub over_budget: bool,
    pub size_budget_bytes: u64,
    pub degraded_pages: Vec<u32>,
}

/// The finished binary ready for upload.
#[derive(Debug, Clone)]
pub struct HandoffDocument {
    pub bytes: Vec<u8>,
    pub size_bytes: u64,
    pub mime: &'static str,
    pub metadata: DocumentMetadata,
    pub report: RunReport,
}

impl HandoffDocument {
    pub fn new(governed: GovernedDocument, metadata: DocumentMetadata) -> Self {
        let ctx = &governed.context;
        let report = RunReport {
            page_count: governed.document.page_count(),
            passes: ctx.passes,
            emergency_pass: ctx.emergency_triggered(),
            over_budget: ctx.over_budget(),
            size_budget_bytes: ctx.size_budget_bytes,
            degraded_pages: ctx.degraded_pages.clone(),
        };
        Self {
            size_bytes: governed.document.total_size_bytes,
            bytes: governed.document.bytes,
            mime: PDF_MIME,
            metadata,
            report,
        }
    }

    pub fn degraded_count(&self) -> usize {
        self.report.degraded_pages.len()
    }

    /// Hand the bytes to the upload collaborator.
    pub fn submit(&self, submitter: &dyn UploadSubmitter) -> crate::error::Result<SubmitReceipt> {
        submitter.submit(&self.bytes, &self.metadata)
    }
}

/// Where the upload collaborator put the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub location: String,
    pub size_bytes: u64,
    pub sha256: String,
}

/// The external upload side. Retries are its own business.
pub trait UploadSubmitter {
    fn submit(&self, bytes: &[u8], metadata: &DocumentMetadata)
    -> crate::error::Result<SubmitReceipt>;
}
