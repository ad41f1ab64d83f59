mod mock_runtime;

pub use mock_runtime::*;

use review_sync::{ArtifactMeta, Reconcile, WorkspaceSession};

pub const TASK: &str = "task-1";

/// A session on `TASK` with the transcript hydrated and the given artifacts
/// registered and hydrated.
pub async fn open_loaded(runtime: &MockRuntime, artifacts: &[&str]) -> WorkspaceSession {
    let session = WorkspaceSession::new(runtime.clone());
    session.open(TASK);
    assert_eq!(session.load_transcript().await.unwrap(), Reconcile::Apply);

    session
        .register_artifacts(
            artifacts
                .iter()
                .map(|id| ArtifactMeta::new(*id, "meeting_minutes", 1)),
        )
        .unwrap();
    for id in artifacts {
        assert_eq!(session.load_artifact(id).await.unwrap(), Reconcile::Apply);
    }
    session
}
