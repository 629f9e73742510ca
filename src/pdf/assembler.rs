// Page assembler: encoded pages in capture order -> one PDF buffer

use tracing::debug;

use crate::encode::{EncodedPage, PageFormat};
use crate::error::ScanPdfError;
use crate::pdf::writer::DocumentWriter;

/// What the caller gets to know about each page without holding its bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub sequence_index: u32,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
    pub format: PageFormat,
    pub encoder: &'static str,
    pub degraded: bool,
}

impl From<&EncodedPage> for PageSummary {
    fn from(page: &EncodedPage) -> Self {
        Self {
            sequence_index: page.sequence_index,
            width: page.width,
            height: page.height,
            size_bytes: page.size_bytes,
            format: page.format,
            encoder: page.encoder,
            degraded: page.degraded,
        }
    }
}

/// A finished PDF plus per-page bookkeeping, pages in capture order.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub pages: Vec<PageSummary>,
    pub bytes: Vec<u8>,
    pub total_size_bytes: u64,
}

impl AssembledDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn degraded_pages(&self) -> Vec<u32> {
        self.pages
            .iter()
            .filter(|p| p.degraded)
            .map(|p| p.sequence_index)
            .collect()
    }
}

/// Lay every page onto its own A4 sheet, ordered by `sequence_index`.
///
/// Fails on an empty page list, duplicate indices, or a page with a zero
/// dimension; no page is ever dropped or reordered past its index.
pub fn assemble(
    mut pages: Vec<EncodedPage>,
    title: Option<&str>,
) -> crate::error::Result<AssembledDocument> {
    if pages.is_empty() {
        return Err(ScanPdfError::CaptureUnavailable);
    }

    // Sort by sequence index for deterministic output
    pages.sort_by_key(|p| p.sequence_index);
    if let Some(dup) = pages
        .windows(2)
        .find(|w| w[0].sequence_index == w[1].sequence_index)
    {
        return Err(ScanPdfError::assembly(format!(
            "sequence index {} appears more than once",
            dup[0].sequence_index
        )));
    }

    let mut writer = DocumentWriter::new();
    if let Some(title) = title {
        writer.set_title(title);
    }
    for page in &pages {
        writer.add_page(page)?;
    }
    let bytes = writer.finish()?;
    let total_size_bytes = bytes.len() as u64;
    debug!(
        pages = pages.len(),
        size = total_size_bytes,
        "document assembled"
    );

    Ok(AssembledDocument {
        pages: pages.iter().map(PageSummary::from).collect(),
        bytes,
        total_size_bytes,
    })
}
