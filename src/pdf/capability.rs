use anyhow::Result;

/// A parsed, page-addressable document.
pub trait PageDocument: Send {
    fn page_count(&self) -> u32;

    /// Build a new document holding the pages at the given zero-based
    /// indices, in ascending order. Page content is carried over untouched.
    fn copy_pages(&self, indices: &[usize]) -> Result<Box<dyn PageDocument>>;

    /// Serialize the document.
    fn to_bytes(&mut self) -> Result<Vec<u8>>;
}

/// The document-processing service the pipeline runs on.
///
/// Implementations are stateless and shared across sessions.
pub trait DocumentCapability: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    fn parse(&self, bytes: &[u8]) -> Result<Box<dyn PageDocument>>;
}
