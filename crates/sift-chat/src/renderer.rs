//! Renderer abstraction over the message log surface

use crate::entry::{EntryId, MessageEntry};

/// Display surface for the message log.
///
/// The workflow only appends and removes entries; it never inspects the
/// surface. An implementation is expected to keep the view scrolled to the
/// newest entry after each `append`. The bound is `Send` so a workflow and
/// its renderer can live inside a spawned task.
pub trait Renderer: Send {
    /// Append an entry to the end of the log
    fn append(&mut self, entry: MessageEntry);

    /// Remove an entry by id. Idempotent: removing an absent id is a no-op.
    /// Returns whether an entry was actually removed.
    fn remove(&mut self, id: &EntryId) -> bool;

    /// Clear the whole log (explicit conversation reset)
    fn clear(&mut self);
}

/// In-memory message log.
///
/// The canonical `Renderer` used headless in tests and as the backing store
/// for concrete display surfaces.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<MessageEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in append order
    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry with the given id is present
    pub fn contains(&self, id: &EntryId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }
}

impl Renderer for Transcript {
    fn append(&mut self, entry: MessageEntry) {
        self.entries.push(entry);
    }

    fn remove(&mut self, id: &EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.id != id);
        self.entries.len() != before
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
