//! Lazily loaded document-processing capability.
//!
//! The capability is loaded on first use and shared for the rest of the
//! process. Concurrent first callers all wait on the same load. A failed load
//! is not remembered: the next caller tries again.

use futures::future::{BoxFuture, FutureExt};
use once_cell::sync::Lazy;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::capability::DocumentCapability;
use super::document::LopdfCapability;
use crate::error::{Error, Result};

pub type CapabilityHandle = Arc<dyn DocumentCapability>;

type LoadFn = dyn Fn() -> BoxFuture<'static, anyhow::Result<CapabilityHandle>> + Send + Sync;

pub struct Library {
    cell: OnceCell<CapabilityHandle>,
    loader: Box<LoadFn>,
    attempts: AtomicUsize,
}

static SHARED: Lazy<Arc<Library>> = Lazy::new(|| Arc::new(Library::bundled()));

/// The process-wide library.
pub fn shared() -> Arc<Library> {
    Arc::clone(&SHARED)
}

impl Library {
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<CapabilityHandle>> + Send + 'static,
    {
        Library {
            cell: OnceCell::new(),
            loader: Box::new(move || loader().boxed()),
            attempts: AtomicUsize::new(0),
        }
    }

    /// A library backed by the built-in `lopdf` capability.
    pub fn bundled() -> Self {
        Library::new(|| async {
            let capability: CapabilityHandle = Arc::new(LopdfCapability);
            Ok(capability)
        })
    }

    /// A library that is already loaded with `capability`.
    ///
    /// Use this to run sessions on a backend other than the bundled one,
    /// e.g. `Session::with_library(Arc::new(Library::preloaded(backend)))`.
    /// The loader is never invoked.
    pub fn preloaded(capability: CapabilityHandle) -> Self {
        let library = Library::new(|| async {
            Err(anyhow::anyhow!("preloaded library has no loader"))
        });
        // A fresh cell always accepts its first value.
        let _ = library.cell.set(capability);
        library
    }

    /// Return the capability, loading it if this is the first use.
    pub async fn get(&self) -> Result<CapabilityHandle> {
        self.cell
            .get_or_try_init(|| {
                let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                log::info!("Loading PDF library (attempt {})", attempt);
                (self.loader)()
            })
            .await
            .map(|capability| {
                log::debug!("Using PDF library {}", capability.name());
                Arc::clone(capability)
            })
            .map_err(|e| {
                log::warn!("PDF library failed to load: {:#}", e);
                Error::LibraryLoad(Error::describe(&e))
            })
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// How many times the loader has been invoked.
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}
