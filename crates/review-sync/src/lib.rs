mod config;
mod error;
mod events;
mod runtime;
mod scheduler;
mod session;
mod state;
mod timer;
mod view;

pub use config::*;
pub use error::*;
pub use events::*;
pub use runtime::*;
pub use session::{WorkspaceSession, WorkspaceSessionBuilder};
pub use timer::TimerTable;
pub use view::*;

pub use hypr_review_document::{
    ArtifactMeta, DiscardReason, Dispatch, DocKey, FocusScope, KeyEvent, KeyOutcome, Paragraph,
    Reconcile, RenameScope, SaveStatus, Shortcut, SpeakerRenames,
};
