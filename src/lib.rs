//! Extract a contiguous page range from a PDF into a new in-memory document.
//!
//! The pipeline is driven through a [`Session`]: select a file, adjust the
//! range, extract, then fetch the published bytes from the session's
//! [`ArtifactStore`].

pub mod artifact;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod page_range;
pub mod pdf;
pub mod session;
pub mod source;

#[cfg(test)]
mod testing;

pub use artifact::{ArtifactStore, DownloadRef};
pub use error::{Error, Result};
pub use metadata::DocumentMetadata;
pub use page_range::{is_valid, PageRange};
pub use session::{Phase, Session, SessionSnapshot};
pub use source::{SourceFile, PDF_MEDIA_TYPE};
