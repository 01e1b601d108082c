//! In-memory PDFs and fake capabilities for unit tests.

use anyhow::Result;
use lopdf::Object::Reference;
use lopdf::{Dictionary, Document, Object, Stream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::pdf::{DocumentCapability, Library, LopdfCapability, PageDocument};
use crate::source::{SourceFile, PDF_MEDIA_TYPE};

/// A PDF with `num_pages` pages, each drawing the text "Page N".
///
/// Fonts live on the page tree root so pages rely on inherited resources.
pub fn sample_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let mut page_ids = vec![];

    let font = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]);
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Dictionary(font))])),
    )]));

    for i in 1..=num_pages {
        let content = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", i);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Contents", Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages_id = doc.new_object_id();
    for page_id in &page_ids {
        if let Ok(page) = doc.get_object_mut(*page_id).and_then(Object::as_dict_mut) {
            page.set("Parent", Reference(pages_id));
        }
    }
    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Reference(*id)).collect()),
        ),
        ("Resources", Reference(resources_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// The "Page N" marker of every page, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = String::from_utf8(doc.get_page_content(*page_id).unwrap()).unwrap();
            let start = content.find('(').unwrap() + 1;
            let end = content.find(')').unwrap();
            content[start..end].to_string()
        })
        .collect()
}

pub fn pdf_file(name: &str, num_pages: u32) -> SourceFile {
    SourceFile::new(name, PDF_MEDIA_TYPE, sample_pdf(num_pages))
}

/// Wraps the lopdf backend with hooks for failure and timing tests.
#[derive(Default)]
pub struct TestCapability {
    fail_copy: AtomicBool,
    gate: Mutex<Option<(u32, Receiver<()>)>>,
}

impl TestCapability {
    pub fn new() -> Arc<Self> {
        Arc::new(TestCapability::default())
    }

    pub fn library(self: &Arc<Self>) -> Arc<Library> {
        Arc::new(Library::preloaded(Arc::clone(self) as Arc<dyn DocumentCapability>))
    }

    pub fn fail_copies(&self, fail: bool) {
        self.fail_copy.store(fail, Ordering::SeqCst);
    }

    /// Block the next parse of a `pages`-page document until the returned
    /// sender fires.
    pub fn hold_next_parse(&self, pages: u32) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        *self.gate.lock().unwrap() = Some((pages, rx));
        tx
    }
}

impl DocumentCapability for TestCapability {
    fn name(&self) -> &str {
        "test"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Box<dyn PageDocument>> {
        let doc = LopdfCapability.parse(bytes)?;
        let held = {
            let mut gate = self.gate.lock().unwrap();
            match gate.take() {
                Some((pages, rx)) if pages == doc.page_count() => Some(rx),
                other => {
                    *gate = other;
                    None
                }
            }
        };
        if let Some(rx) = held {
            let _ = rx.recv();
        }
        Ok(Box::new(TestDocument {
            inner: doc,
            fail_copy: self.fail_copy.load(Ordering::SeqCst),
        }))
    }
}

struct TestDocument {
    inner: Box<dyn PageDocument>,
    fail_copy: bool,
}

impl PageDocument for TestDocument {
    fn page_count(&self) -> u32 {
        self.inner.page_count()
    }

    fn copy_pages(&self, indices: &[usize]) -> Result<Box<dyn PageDocument>> {
        if self.fail_copy {
            anyhow::bail!("copy failed");
        }
        self.inner.copy_pages(indices)
    }

    fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.inner.to_bytes()
    }
}
