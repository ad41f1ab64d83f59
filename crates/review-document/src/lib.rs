mod artifact;
mod content;
mod dirty;
mod focus;
mod history;
pub mod minutes;
mod model;
mod reconcile;
mod transcript;

pub use artifact::ArtifactDraft;
pub use content::SameContent;
pub use dirty::DirtyTracker;
pub use focus::{Dispatch, FocusRouter, FocusScope, KeyEvent, KeyOutcome, Shortcut};
pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryStack};
pub use model::{ArtifactMeta, DocKey, Paragraph, RenameScope, SaveStatus, SpeakerRenames};
pub use reconcile::{DiscardReason, FetchGate, Reconcile};
pub use transcript::{TranscriptDocument, TranscriptSnapshot};
