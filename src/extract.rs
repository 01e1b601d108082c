use anyhow::Context;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::metadata::DocumentMetadata;
use crate::page_range::PageRange;
use crate::pdf::Library;

/// Build a new PDF holding pages `range.start..=range.end` of `source`.
///
/// The source is parsed again rather than reusing a handle from metadata
/// loading. Pages keep their original order and content.
pub async fn extract_range(
    library: &Library,
    source: Arc<[u8]>,
    range: PageRange,
    metadata: DocumentMetadata,
) -> Result<Vec<u8>> {
    if !range.is_valid_for(metadata.total_pages) {
        return Err(Error::InvalidRange {
            start: range.start,
            end: range.end,
            total: metadata.total_pages,
        });
    }

    let capability = library.get().await?;
    let indices = range.indices();
    let expected = range.len();

    let bytes = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<u8>> {
        let doc = capability
            .parse(&source)
            .context("Failed to re-parse source PDF")?;
        let mut extracted = doc.copy_pages(&indices)?;

        let copied = extracted.page_count();
        if copied != expected {
            anyhow::bail!("Expected {} page(s) in output, got {}", expected, copied);
        }

        extracted.to_bytes()
    })
    .await
    .map_err(|e| Error::Extraction(e.to_string()))?
    .map_err(|e| Error::Extraction(Error::describe(&e)))?;

    log::info!(
        "Extracted pages {} ({} page(s), {} bytes)",
        range,
        expected,
        bytes.len()
    );
    Ok(bytes)
}
