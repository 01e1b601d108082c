use anyhow::{Context, Result};
use lopdf::{Document, ObjectId};
use std::collections::HashSet;

use super::capability::{DocumentCapability, PageDocument};

/// A PDF loaded into memory with `lopdf`.
pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).context("Failed to parse PDF")?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        self.doc.get_pages().into_iter().collect()
    }

    /// Copy the pages at ascending zero-based `indices` into a new document.
    ///
    /// The new document starts as a copy of this one with every other page
    /// removed from the page tree, so inherited resources and page content
    /// stay as they were. Unreachable objects are pruned before returning.
    pub fn extract_pages(&self, indices: &[usize]) -> Result<PdfDocument> {
        if indices.is_empty() {
            anyhow::bail!("No pages specified");
        }

        let all_pages = self.page_ids();
        let total = all_pages.len();

        for &index in indices {
            if index >= total {
                anyhow::bail!("Page {} is out of range (1-{})", index + 1, total);
            }
        }
        if indices.windows(2).any(|w| w[0] >= w[1]) {
            anyhow::bail!("Page indices must be strictly ascending");
        }

        let keep: HashSet<u32> = indices.iter().map(|&i| i as u32 + 1).collect();
        let pages_to_delete: Vec<u32> = all_pages
            .iter()
            .filter(|(num, _)| !keep.contains(num))
            .map(|(num, _)| *num)
            .collect();

        let mut new_doc = self.doc.clone();
        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
        }
        new_doc.prune_objects();

        Ok(PdfDocument { doc: new_doc })
    }

    pub fn save_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .context("Failed to serialize PDF")?;
        Ok(buffer)
    }
}

impl PageDocument for PdfDocument {
    fn page_count(&self) -> u32 {
        PdfDocument::page_count(self)
    }

    fn copy_pages(&self, indices: &[usize]) -> Result<Box<dyn PageDocument>> {
        Ok(Box::new(self.extract_pages(indices)?))
    }

    fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.save_to_vec()
    }
}

/// The bundled backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfCapability;

impl DocumentCapability for LopdfCapability {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Box<dyn PageDocument>> {
        Ok(Box::new(PdfDocument::load(bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page_labels, sample_pdf};

    #[test]
    fn test_page_count() {
        let doc = PdfDocument::load(&sample_pdf(7)).unwrap();
        assert_eq!(doc.page_count(), 7);
        assert_eq!(doc.page_ids().len(), 7);
        assert_eq!(doc.page_ids()[0].0, 1);
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(PdfDocument::load(b"this is not a pdf").is_err());
        assert!(PdfDocument::load(&[]).is_err());
    }

    #[test]
    fn test_extract_keeps_order_and_content() {
        let doc = PdfDocument::load(&sample_pdf(10)).unwrap();
        let mut extracted = doc.extract_pages(&[2, 3, 4]).unwrap();
        assert_eq!(extracted.page_count(), 3);

        let bytes = extracted.save_to_vec().unwrap();
        assert_eq!(page_labels(&bytes), vec!["Page 3", "Page 4", "Page 5"]);
    }

    #[test]
    fn test_extract_whole_document() {
        let doc = PdfDocument::load(&sample_pdf(4)).unwrap();
        let mut extracted = doc.extract_pages(&[0, 1, 2, 3]).unwrap();
        let bytes = extracted.save_to_vec().unwrap();
        assert_eq!(
            page_labels(&bytes),
            vec!["Page 1", "Page 2", "Page 3", "Page 4"]
        );
    }

    #[test]
    fn test_extract_leaves_source_untouched() {
        let doc = PdfDocument::load(&sample_pdf(5)).unwrap();
        doc.extract_pages(&[4]).unwrap();
        assert_eq!(doc.page_count(), 5);
    }

    #[test]
    fn test_extract_out_of_range() {
        let doc = PdfDocument::load(&sample_pdf(3)).unwrap();
        let err = doc.extract_pages(&[1, 2, 3]).err().unwrap();
        assert!(err.to_string().contains("Page 4 is out of range (1-3)"));
    }

    #[test]
    fn test_extract_rejects_empty_and_unordered() {
        let doc = PdfDocument::load(&sample_pdf(3)).unwrap();
        assert!(doc.extract_pages(&[]).is_err());
        assert!(doc.extract_pages(&[2, 1]).is_err());
    }

    #[test]
    fn test_capability_roundtrip() {
        let capability = LopdfCapability;
        let source = capability.parse(&sample_pdf(6)).unwrap();
        assert_eq!(source.page_count(), 6);

        let mut copy = source.copy_pages(&[5]).unwrap();
        let bytes = copy.to_bytes().unwrap();
        assert_eq!(page_labels(&bytes), vec!["Page 6"]);
    }
}
