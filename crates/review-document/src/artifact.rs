use crate::dirty::DirtyTracker;
use crate::model::ArtifactMeta;
use crate::reconcile::FetchGate;

/// Local editable copy of one generated artifact version.
///
/// Undo/redo for drafts belongs to the rich-text editor, so unlike the
/// transcript there is no history here.
#[derive(Debug, Clone)]
pub struct ArtifactDraft {
    meta: ArtifactMeta,
    content: String,
    tracker: DirtyTracker,
    gate: FetchGate,
    visible: bool,
}

impl ArtifactDraft {
    pub fn new(meta: ArtifactMeta) -> Self {
        Self {
            meta,
            content: String::new(),
            tracker: DirtyTracker::new(),
            gate: FetchGate::default(),
            visible: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta.artifact_id
    }

    pub fn meta(&self) -> &ArtifactMeta {
        &self.meta
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DirtyTracker {
        &mut self.tracker
    }

    pub fn gate(&self) -> &FetchGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut FetchGate {
        &mut self.gate
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Returns whether the content changed.
    pub fn set_content(&mut self, content: &str) -> bool {
        if self.content == content {
            return false;
        }
        self.content = content.to_string();
        self.tracker.mark_dirty();
        true
    }

    pub fn hydrate(&mut self, content: String) {
        self.content = content;
        self.tracker.mark_hydrated();
        self.gate.mark_synced();
    }
}
