//! Downloadable output documents.
//!
//! An [`ArtifactStore`] hands out revocable [`DownloadRef`]s for extracted
//! bytes, much like object URLs. A reference stays fetchable until it is
//! revoked; nothing is released implicitly. [`ArtifactSlot`] keeps the one
//! live reference a session is allowed.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::page_range::PageRange;
use crate::source::PDF_MEDIA_TYPE;

/// Handle to published bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRef {
    id: u64,
    file_name: String,
    media_type: &'static str,
    size: usize,
}

impl DownloadRef {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Suggested name for the downloaded file.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        self.media_type
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl std::fmt::Display for DownloadRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "artifact:{}/{}", self.id, self.file_name)
    }
}

#[derive(Debug, Default)]
pub struct ArtifactStore {
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, Arc<[u8]>>>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self) -> MutexGuard<'_, HashMap<u64, Arc<[u8]>>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `bytes` and return a new live reference to them.
    pub fn create(&self, bytes: Vec<u8>, file_name: impl Into<String>) -> DownloadRef {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = DownloadRef {
            id,
            file_name: file_name.into(),
            media_type: PDF_MEDIA_TYPE,
            size: bytes.len(),
        };
        self.live().insert(id, bytes.into());
        log::debug!("Published {} ({} bytes)", reference, reference.size);
        reference
    }

    /// Release the bytes behind `reference`. Unknown or already revoked
    /// references are ignored. Returns whether anything was released.
    pub fn revoke(&self, reference: &DownloadRef) -> bool {
        let released = self.live().remove(&reference.id).is_some();
        if released {
            log::debug!("Revoked {}", reference);
        }
        released
    }

    pub fn fetch(&self, reference: &DownloadRef) -> Option<Arc<[u8]>> {
        self.live().get(&reference.id).cloned()
    }

    pub fn is_live(&self, reference: &DownloadRef) -> bool {
        self.live().contains_key(&reference.id)
    }

    pub fn live_count(&self) -> usize {
        self.live().len()
    }
}

/// Holds at most one live reference.
#[derive(Debug, Default)]
pub struct ArtifactSlot {
    current: Option<DownloadRef>,
}

impl ArtifactSlot {
    /// Revoke the current reference, then publish `bytes` as the new one.
    pub fn publish(
        &mut self,
        store: &ArtifactStore,
        bytes: Vec<u8>,
        file_name: impl Into<String>,
    ) -> DownloadRef {
        self.clear(store);
        let reference = store.create(bytes, file_name);
        self.current = Some(reference.clone());
        reference
    }

    /// Revoke and forget the current reference, if any.
    pub fn clear(&mut self, store: &ArtifactStore) {
        if let Some(reference) = self.current.take() {
            store.revoke(&reference);
        }
    }

    pub fn current(&self) -> Option<&DownloadRef> {
        self.current.as_ref()
    }
}

/// Download name for pages `range` of `source_stem`, e.g. "report_pages_3-5.pdf".
pub fn artifact_file_name(source_stem: &str, range: PageRange) -> String {
    format!("{}_pages_{}.pdf", source_stem, range)
}
