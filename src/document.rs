//! The active document and its store

use crate::error::{Error, Result};
use crate::layout::{Line, Page};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// An uploaded document and its display model
#[derive(Debug)]
pub struct Document {
    id: Uuid,
    uploaded_at: DateTime<Utc>,
    data: Vec<u8>,
    pages: Vec<Page>,
}

impl Document {
    pub fn new(data: Vec<u8>, pages: Vec<Page>) -> Self {
        Self {
            id: Uuid::new_v4(),
            uploaded_at: Utc::now(),
            data,
            pages,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    /// Raw PDF bytes, kept for rendering at display time
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Clamp a requested page index to the last page
    pub fn clamp_page(&self, index: usize) -> Option<usize> {
        if self.pages.is_empty() {
            None
        } else {
            Some(index.min(self.pages.len() - 1))
        }
    }

    /// Line at `(page, line)`; the page index is clamped, the line index is not
    pub fn line(&self, page: usize, line: usize) -> Option<(usize, &Line)> {
        let page = self.clamp_page(page)?;
        self.pages[page].line(line).map(|l| (page, l))
    }
}

/// Holds the single active document.
///
/// Readers take an `Arc` snapshot and never see a half-replaced document;
/// an upload swaps the whole value in one write.
#[derive(Debug, Default)]
pub struct DocumentStore {
    active: RwLock<Option<Arc<Document>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `document` as the active one and return a snapshot of it.
    /// The previous document is dropped once its last reader finishes.
    pub fn replace(&self, document: Document) -> Arc<Document> {
        let document = Arc::new(document);
        *self.active.write() = Some(Arc::clone(&document));
        document
    }

    /// Snapshot of the active document
    pub fn current(&self) -> Option<Arc<Document>> {
        self.active.read().clone()
    }

    /// Snapshot of the active document, or [`Error::NoDocument`]
    pub fn require(&self) -> Result<Arc<Document>> {
        self.current().ok_or(Error::NoDocument)
    }
}
