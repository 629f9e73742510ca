// ジョブ単位: 画像読込 -> サイズ制御付きPDF生成 -> ディレクトリへ提出

use std::path::PathBuf;

use crate::capture::CaptureBuffer;
use crate::config::merged::MergedConfig;
use crate::handoff::{DirectorySubmitter, DocumentMetadata, HandoffDocument, RunReport};
use crate::pipeline::governor::SizeGovernor;

/// Configuration for a single job.
pub struct JobConfig {
    /// Page images in capture order.
    pub images: Vec<PathBuf>,
    /// Directory handed to the submitter.
    pub output_dir: PathBuf,
    pub metadata: DocumentMetadata,
    pub config: MergedConfig,
}

/// Result of processing a single job.
#[derive(Debug)]
pub struct JobResult {
    pub output_path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
    pub report: RunReport,
}

/// Run a single capture job.
///
/// 1. Read every image into a capture buffer (order as listed)
/// 2. Run the size-governed pipeline
/// 3. Submit the PDF to the output directory
pub fn run_job(job: &JobConfig) -> crate::error::Result<JobResult> {
    let mut buffer = CaptureBuffer::new();
    for path in &job.images {
        buffer.push_file(path)?;
    }

    let governor = SizeGovernor::new(&job.config)?;
    let governed = governor.run_titled(
        buffer.images(),
        Some(job.metadata.display_file_name.as_str()),
    )?;

    let document = HandoffDocument::new(governed, job.metadata.clone());
    let submitter = DirectorySubmitter::new(&job.output_dir);
    let receipt = document.submit(&submitter)?;

    Ok(JobResult {
        output_path: submitter.pdf_path(&document.metadata),
        size_bytes: receipt.size_bytes,
        sha256: receipt.sha256,
        report: document.report,
    })
}
