//! The extraction session.
//!
//! A [`Session`] owns all state for one uploaded file and moves through
//! `Idle → Loading → Ready → Extracting → Ready`. Every async step releases
//! the state lock before suspending, so the presentation layer can keep
//! reading snapshots and issuing commands while work is in flight.
//!
//! Selecting a new file or resetting while a load or extraction is running
//! is allowed. The running operation completes, and its result is dropped
//! because the session generation moved on. An extraction whose range was
//! edited while it ran is dropped the same way.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::artifact::{artifact_file_name, ArtifactSlot, ArtifactStore, DownloadRef};
use crate::extract::extract_range;
use crate::metadata::{load_metadata, DocumentMetadata};
use crate::page_range::{is_valid, PageRange};
use crate::pdf::{library, Library};
use crate::source::SourceFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Extracting,
}

impl Phase {
    pub fn is_processing(self) -> bool {
        matches!(self, Phase::Loading | Phase::Extracting)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    phase: Phase,
    source: Option<SourceFile>,
    metadata: Option<DocumentMetadata>,
    range: PageRange,
    error: Option<String>,
    artifact: ArtifactSlot,
    generation: u64,
    range_revision: u64,
}

impl SessionState {
    /// Back to the startup shape, releasing the artifact.
    fn clear(&mut self, store: &ArtifactStore) {
        self.artifact.clear(store);
        self.discard_document();
        self.error = None;
        self.generation += 1;
    }

    fn discard_document(&mut self) {
        self.source = None;
        self.metadata = None;
        self.range = PageRange::default();
        self.phase = Phase::Idle;
    }

    fn range_valid(&self) -> bool {
        self.metadata
            .map(|m| is_valid(self.range.start, self.range.end, m.total_pages))
            .unwrap_or(false)
    }

    fn can_extract(&self) -> bool {
        self.phase == Phase::Ready && self.range_valid()
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything the presentation layer reads, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub processing: bool,
    pub file_name: Option<String>,
    pub file_size: Option<usize>,
    pub total_pages: Option<u32>,
    pub range: PageRange,
    pub range_valid: bool,
    pub can_extract: bool,
    pub error: Option<String>,
    pub artifact: Option<DownloadRef>,
}

/// Resets a processing phase if the future driving it is dropped early.
struct ProcessingGuard {
    state: Arc<Mutex<SessionState>>,
    generation: u64,
    phase: Phase,
    armed: bool,
}

impl ProcessingGuard {
    fn new(state: &Arc<Mutex<SessionState>>, generation: u64, phase: Phase) -> Self {
        ProcessingGuard {
            state: Arc::clone(state),
            generation,
            phase,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock(&self.state);
        if state.generation != self.generation || state.phase != self.phase {
            return;
        }
        log::warn!("{:?} abandoned before completion", self.phase);
        match self.phase {
            Phase::Loading => state.discard_document(),
            _ => state.phase = Phase::Ready,
        }
    }
}

#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    library: Arc<Library>,
    store: Arc<ArtifactStore>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session on the process-wide library.
    pub fn new() -> Self {
        Self::with_library(library::shared())
    }

    pub fn with_library(library: Arc<Library>) -> Self {
        Session {
            state: Arc::new(Mutex::new(SessionState::default())),
            library,
            store: Arc::new(ArtifactStore::new()),
        }
    }

    /// The store the session's download references resolve against.
    pub fn artifacts(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            phase: state.phase,
            processing: state.phase.is_processing(),
            file_name: state.source.as_ref().map(|s| s.name().to_string()),
            file_size: state.source.as_ref().map(SourceFile::len),
            total_pages: state.metadata.map(|m| m.total_pages),
            range: state.range,
            range_valid: state.range_valid(),
            can_extract: state.can_extract(),
            error: state.error.clone(),
            artifact: state.artifact.current().cloned(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    pub fn is_processing(&self) -> bool {
        self.state().phase.is_processing()
    }

    pub fn metadata(&self) -> Option<DocumentMetadata> {
        self.state().metadata
    }

    pub fn range(&self) -> PageRange {
        self.state().range
    }

    /// Whether the current range fits the loaded document. Recomputed on
    /// every call.
    pub fn is_range_valid(&self) -> bool {
        self.state().range_valid()
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn artifact(&self) -> Option<DownloadRef> {
        self.state().artifact.current().cloned()
    }

    /// Accept `file` and load its page count.
    ///
    /// A file that is not a PDF only sets the error message; the session
    /// otherwise stays as it was. A PDF replaces everything: the previous
    /// artifact is revoked and the range is reset to the whole new document
    /// once it loads. Returns the metadata if this call's load was published.
    pub async fn select_file(&self, file: SourceFile) -> Option<DocumentMetadata> {
        let generation = {
            let mut state = self.state();
            if let Err(err) = file.check_media_type() {
                log::warn!("Rejected {}: {}", file.name(), err);
                state.error = Some(err.to_string());
                return None;
            }
            state.clear(&self.store);
            state.source = Some(file.clone());
            state.phase = Phase::Loading;
            log::info!("Loading {} ({} bytes)", file.name(), file.len());
            state.generation
        };

        let guard = ProcessingGuard::new(&self.state, generation, Phase::Loading);
        let result = load_metadata(&self.library, &file).await;
        guard.disarm();

        let mut state = self.state();
        if state.generation != generation {
            log::debug!("Discarding load of superseded file {}", file.name());
            return None;
        }
        match result {
            Ok(metadata) => {
                state.metadata = Some(metadata);
                state.range = PageRange::all(metadata.total_pages);
                state.phase = Phase::Ready;
                log::info!("{} ready, {} page(s)", file.name(), metadata.total_pages);
                Some(metadata)
            }
            Err(err) => {
                log::warn!("Failed to load {}: {}", file.name(), err);
                state.discard_document();
                state.error = Some(err.to_string());
                None
            }
        }
    }

    pub fn set_start(&self, start: u32) -> bool {
        self.edit_range(|range| range.start = start)
    }

    pub fn set_end(&self, end: u32) -> bool {
        self.edit_range(|range| range.end = end)
    }

    pub fn set_range(&self, new_range: PageRange) -> bool {
        self.edit_range(|range| *range = new_range)
    }

    /// Apply `edit` to the range. Any published artifact no longer matches
    /// and is revoked. Ignored until a document is loaded.
    fn edit_range(&self, edit: impl FnOnce(&mut PageRange)) -> bool {
        let mut state = self.state();
        if state.metadata.is_none() {
            log::debug!("Range edit ignored: no document loaded");
            return false;
        }
        edit(&mut state.range);
        state.range_revision += 1;
        state.artifact.clear(&self.store);
        log::debug!("Range set to {}", state.range);
        true
    }

    /// Extract the current range into a new artifact.
    ///
    /// Does nothing unless the session is ready, idle of other work, and the
    /// range is valid. The previous artifact is revoked before work starts,
    /// so a failed extraction leaves no live artifact and sets the error
    /// message instead.
    pub async fn extract(&self) -> Option<DownloadRef> {
        let (generation, revision, source, range, metadata) = {
            let mut state = self.state();
            if state.phase.is_processing() {
                log::debug!("Extraction rejected: session busy ({:?})", state.phase);
                return None;
            }
            if !state.can_extract() {
                log::debug!("Extraction rejected: range {} not usable", state.range);
                return None;
            }
            let (Some(source), Some(metadata)) = (state.source.clone(), state.metadata) else {
                return None;
            };
            state.artifact.clear(&self.store);
            state.error = None;
            state.phase = Phase::Extracting;
            (
                state.generation,
                state.range_revision,
                source,
                state.range,
                metadata,
            )
        };

        let guard = ProcessingGuard::new(&self.state, generation, Phase::Extracting);
        let result = extract_range(&self.library, source.shared_bytes(), range, metadata).await;
        guard.disarm();

        let mut state = self.state();
        if state.generation != generation {
            log::debug!("Discarding extraction for superseded file {}", source.name());
            return None;
        }
        state.phase = Phase::Ready;
        if state.range_revision != revision {
            log::debug!("Discarding extraction of {}: range changed", range);
            return None;
        }
        match result {
            Ok(bytes) => {
                let file_name = artifact_file_name(source.stem(), range);
                let reference = state.artifact.publish(&self.store, bytes, file_name);
                log::info!("Published {}", reference);
                Some(reference)
            }
            Err(err) => {
                log::warn!("Extraction of {} failed: {}", range, err);
                state.error = Some(err.to_string());
                None
            }
        }
    }

    /// Return to the startup state and revoke any live artifact.
    pub fn reset(&self) {
        self.state().clear(&self.store);
        log::info!("Session reset");
    }
}
