use serde::Serialize;

use crate::error::{Error, Result};
use crate::pdf::Library;
use crate::source::SourceFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub total_pages: u32,
}

/// Parse `file` with the library's capability and report its page count.
///
/// Parsing runs on the blocking pool. A document that cannot be parsed, or
/// that has no pages, is reported as [`Error::CorruptDocument`].
pub async fn load_metadata(library: &Library, file: &SourceFile) -> Result<DocumentMetadata> {
    let capability = library.get().await?;
    let bytes = file.shared_bytes();

    let total_pages = tokio::task::spawn_blocking(move || -> anyhow::Result<u32> {
        let doc = capability.parse(&bytes)?;
        Ok(doc.page_count())
    })
    .await
    .map_err(|e| Error::CorruptDocument(e.to_string()))?
    .map_err(|e| Error::CorruptDocument(Error::describe(&e)))?;

    if total_pages == 0 {
        return Err(Error::CorruptDocument("document has no pages".to_string()));
    }

    log::debug!("{} has {} page(s)", file.name(), total_pages);
    Ok(DocumentMetadata { total_pages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PDF_MEDIA_TYPE;
    use crate::testing::pdf_file;

    #[tokio::test]
    async fn test_reports_true_page_count() {
        let library = Library::bundled();
        for pages in [1, 2, 10, 37] {
            let metadata = load_metadata(&library, &pdf_file("a.pdf", pages))
                .await
                .unwrap();
            assert_eq!(metadata.total_pages, pages);
        }
    }

    #[tokio::test]
    async fn test_corrupt_bytes() {
        let library = Library::bundled();
        let file = SourceFile::new("bad.pdf", PDF_MEDIA_TYPE, b"not a pdf at all".to_vec());
        let err = load_metadata(&library, &file).await.unwrap_err();
        assert!(matches!(err, Error::CorruptDocument(_)));
    }

    #[tokio::test]
    async fn test_empty_document() {
        let library = Library::bundled();
        let file = pdf_file("empty.pdf", 0);
        assert_eq!(
            load_metadata(&library, &file).await,
            Err(Error::CorruptDocument("document has no pages".into()))
        );
    }

    #[tokio::test]
    async fn test_library_unavailable() {
        let library = Library::new(|| async { Err(anyhow::anyhow!("network unreachable")) });
        let err = load_metadata(&library, &pdf_file("a.pdf", 2))
            .await
            .unwrap_err();
        assert_eq!(err, Error::LibraryLoad("network unreachable".into()));
    }
}
