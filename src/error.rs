//! Error types surfaced by the extraction pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between selecting a file and publishing the
/// extracted document.
///
/// The `Display` text is what the session shows as its error message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The selected file does not declare the PDF media type.
    #[error("Unsupported file type '{0}': please select a PDF document")]
    InvalidFileType(String),

    /// The bytes could not be parsed as a page-addressable document.
    #[error("Could not read PDF: {0}")]
    CorruptDocument(String),

    /// The requested range does not fit the loaded document.
    #[error("Invalid page range {start}-{end} for a document with {total} page(s)")]
    InvalidRange { start: u32, end: u32, total: u32 },

    /// Copying or serializing the selected pages failed.
    #[error("Failed to extract pages: {0}")]
    Extraction(String),

    /// The document-processing library could not be loaded.
    #[error("PDF library unavailable: {0}")]
    LibraryLoad(String),
}

impl Error {
    /// Flatten an `anyhow` chain into a single line.
    pub(crate) fn describe(err: &anyhow::Error) -> String {
        format!("{:#}", err)
    }
}
