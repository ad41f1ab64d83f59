use crate::model::SaveStatus;

/// Save bookkeeping for a single document.
///
/// Edits bump a revision counter; a save captures the revision it carried so
/// that an edit made while the save was in flight keeps the document dirty
/// after the save resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyTracker {
    dirty: bool,
    status: SaveStatus,
    confirmed: bool,
    revision: u64,
    saved_revision: u64,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an edit. Always invalidates a prior human confirmation.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.confirmed = false;
        self.revision += 1;
    }

    pub fn mark_saving(&mut self) {
        self.status = SaveStatus::Saving;
    }

    /// Everything up to the current revision is persisted.
    pub fn mark_saved(&mut self) {
        self.mark_saved_through(self.revision);
    }

    /// A save carrying `revision` succeeded. Edits newer than that revision
    /// keep the document dirty.
    pub fn mark_saved_through(&mut self, revision: u64) {
        self.saved_revision = self.saved_revision.max(revision);
        self.status = SaveStatus::Saved;
        self.dirty = self.revision > self.saved_revision;
    }

    pub fn mark_error(&mut self) {
        self.status = SaveStatus::Error;
    }

    /// Local content was replaced by the server's copy.
    pub fn mark_hydrated(&mut self) {
        self.saved_revision = self.revision;
        self.dirty = false;
        self.status = SaveStatus::Saved;
    }

    pub fn set_confirmed(&mut self, confirmed: bool) {
        self.confirmed = confirmed;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
