pub mod capability;
pub mod document;
pub mod library;

pub use capability::{DocumentCapability, PageDocument};
pub use document::{LopdfCapability, PdfDocument};
pub use library::Library;
