use std::future::Future;
use std::pin::Pin;

use hypr_review_document::{Paragraph, SpeakerRenames};

use crate::events::SessionEvent;

pub type RuntimeError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Body of a transcript save.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TranscriptSave {
    pub task_id: String,
    /// Paragraphs as `[speaker] text` lines.
    pub corrected_text: String,
    /// Only present when a global rename is waiting to be persisted.
    pub speaker_renames: Option<SpeakerRenames>,
}

/// The host side of a review workspace: persistence, fetching and event
/// delivery to the UI.
///
/// The server is last-writer-wins; the session guarantees at most one
/// outstanding save per document, so implementations need no locking of
/// their own. Errors are reported back to the UI as a save status and never
/// surface from the session's entry points.
///
/// Object-safe through explicit [`BoxFuture`] returns.
pub trait WorkspaceRuntime: Send + Sync + 'static {
    fn save_transcript<'a>(&'a self, save: &'a TranscriptSave)
    -> BoxFuture<'a, Result<(), RuntimeError>>;

    fn save_artifact<'a>(
        &'a self,
        artifact_id: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, Result<(), RuntimeError>>;

    fn fetch_transcript<'a>(
        &'a self,
        task_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Paragraph>, RuntimeError>>;

    /// Raw artifact content; structured minutes JSON is rendered to markdown
    /// by the session.
    fn fetch_artifact<'a>(&'a self, artifact_id: &'a str)
    -> BoxFuture<'a, Result<String, RuntimeError>>;

    fn emit(&self, _event: SessionEvent) {}
}
