// Directory drop: <name>.pdf + <name>.json sidecar

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::ScanPdfError;
use crate::handoff::{DocumentMetadata, SubmitReceipt, UploadSubmitter};

/// Writes submitted documents into a local directory.
///
/// Used by the CLI in place of the network uploader.
pub struct DirectorySubmitter {
    dir: PathBuf,
}

/// Sidecar written next to the PDF.
#[derive(Serialize)]
struct Sidecar<'a> {
    patient_identifier: &'a str,
    display_file_name: &'a str,
    mime: &'a str,
    size_bytes: u64,
    sha256: &'a str,
}

impl DirectorySubmitter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path the PDF for `metadata` is written to.
    pub fn pdf_path(&self, metadata: &DocumentMetadata) -> PathBuf {
        self.dir.join(&metadata.display_file_name)
    }

    pub fn sidecar_path(&self, metadata: &DocumentMetadata) -> PathBuf {
        self.pdf_path(metadata).with_extension("json")
    }
}

impl UploadSubmitter for DirectorySubmitter {
    fn submit(
        &self,
        bytes: &[u8],
        metadata: &DocumentMetadata,
    ) -> crate::error::Result<SubmitReceipt> {
        if bytes.is_empty() {
            return Err(ScanPdfError::submit("refusing to submit an empty document"));
        }
        fs::create_dir_all(&self.dir)?;

        let sha256 = hex::encode(Sha256::digest(bytes));
        let pdf_path = self.pdf_path(metadata);
        fs::write(&pdf_path, bytes)?;

        let sidecar = Sidecar {
            patient_identifier: &metadata.patient_identifier,
            display_file_name: &metadata.display_file_name,
            mime: super::PDF_MIME,
            size_bytes: bytes.len() as u64,
            sha256: &sha256,
        };
        fs::write(
            self.sidecar_path(metadata),
            serde_json::to_vec_pretty(&sidecar)?,
        )?;

        info!(
            path = %pdf_path.display(),
            size = bytes.len(),
            patient = %metadata.patient_identifier,
            "document submitted"
        );

        Ok(SubmitReceipt {
            location: pdf_path.display().to_string(),
            size_bytes: bytes.len() as u64,
            sha256,
        })
    }
}
