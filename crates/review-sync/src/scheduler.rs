use std::collections::HashMap;

use hypr_review_document::{DocKey, SaveStatus};

use crate::runtime::{RuntimeError, TranscriptSave, WorkspaceRuntime};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SavePayload {
    Transcript(TranscriptSave),
    Artifact { artifact_id: String, content: String },
}

/// A save captured under the state lock, ready to go out over the network.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SaveRequest {
    pub key: DocKey,
    pub epoch: u64,
    pub revision: u64,
    pub payload: SavePayload,
}

#[derive(Debug)]
pub(crate) enum BeginSave {
    Started(SaveRequest),
    /// Another save for the key is in flight; this one will run right after.
    Deferred,
    /// Nothing to save.
    Idle(SaveStatus),
}

#[derive(Debug, Default)]
struct Slot {
    in_flight: bool,
    trailing: bool,
}

/// At most one outstanding save per key. A request arriving while one is in
/// flight is remembered, not queued, and replayed once with whatever the
/// document holds at that point.
#[derive(Debug, Default)]
pub(crate) struct SaveSlots {
    slots: HashMap<DocKey, Slot>,
}

impl SaveSlots {
    /// Returns `false` when the key is busy; the request is then recorded as
    /// trailing.
    pub fn try_begin(&mut self, key: &DocKey) -> bool {
        let slot = self.slots.entry(key.clone()).or_default();
        if slot.in_flight {
            slot.trailing = true;
            return false;
        }
        slot.in_flight = true;
        true
    }

    /// Releases the key. Returns whether a trailing request must run now.
    pub fn finish(&mut self, key: &DocKey) -> bool {
        match self.slots.get_mut(key) {
            Some(slot) => {
                slot.in_flight = false;
                std::mem::take(&mut slot.trailing)
            }
            None => false,
        }
    }
}

pub(crate) async fn persist(
    runtime: &dyn WorkspaceRuntime,
    payload: &SavePayload,
) -> Result<(), RuntimeError> {
    match payload {
        SavePayload::Transcript(save) => runtime.save_transcript(save).await,
        SavePayload::Artifact {
            artifact_id,
            content,
        } => runtime.save_artifact(artifact_id, content).await,
    }
}
