use hypr_review_document::{
    ArtifactDraft, ArtifactMeta, DirtyTracker, FocusScope, Paragraph, SaveStatus, SpeakerRenames,
};

use crate::state::SessionState;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct DocumentStatus {
    pub dirty: bool,
    pub status: SaveStatus,
    pub confirmed: bool,
}

impl From<&DirtyTracker> for DocumentStatus {
    fn from(tracker: &DirtyTracker) -> Self {
        Self {
            dirty: tracker.is_dirty(),
            status: tracker.status(),
            confirmed: tracker.is_confirmed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TranscriptView {
    pub paragraphs: Vec<Paragraph>,
    pub pending_renames: SpeakerRenames,
    #[serde(flatten)]
    pub status: DocumentStatus,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct ArtifactView {
    #[serde(flatten)]
    pub meta: ArtifactMeta,
    pub label: String,
    pub content: String,
    #[serde(flatten)]
    pub status: DocumentStatus,
    pub synced_since_fetch: bool,
}

impl From<&ArtifactDraft> for ArtifactView {
    fn from(draft: &ArtifactDraft) -> Self {
        Self {
            meta: draft.meta().clone(),
            label: draft.meta().label(),
            content: draft.content().to_string(),
            status: draft.tracker().into(),
            synced_since_fetch: draft.gate().is_synced(),
        }
    }
}

/// Read-only picture of the open task for rendering.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct WorkspaceView {
    pub task_id: Option<String>,
    pub transcript: TranscriptView,
    /// Visible artifacts only, in the order they were first observed.
    pub artifacts: Vec<ArtifactView>,
    pub active_artifact: Option<String>,
    pub focus: Option<FocusScope>,
}

impl WorkspaceView {
    pub(crate) fn from_state(state: &SessionState) -> Self {
        let transcript = &state.transcript;
        let history = transcript.history();

        Self {
            task_id: state.task_id.clone(),
            transcript: TranscriptView {
                paragraphs: transcript.paragraphs().to_vec(),
                pending_renames: transcript.pending_renames().clone(),
                status: transcript.tracker().into(),
                can_undo: history.can_undo(),
                can_redo: history.can_redo(),
            },
            artifacts: state
                .visible_ids()
                .filter_map(|id| state.artifacts.get(id))
                .map(ArtifactView::from)
                .collect(),
            active_artifact: state.active_artifact.clone(),
            focus: state.focus.last_active(),
        }
    }
}
