use std::collections::HashMap;

use hypr_review_document::{
    ArtifactDraft, ArtifactMeta, DirtyTracker, DocKey, FocusRouter, SaveStatus,
    TranscriptDocument,
};

use crate::events::SessionEvent;
use crate::runtime::{RuntimeError, TranscriptSave};
use crate::scheduler::{BeginSave, SavePayload, SaveRequest, SaveSlots};

/// Everything owned on behalf of the open task. Rebuilt from scratch on every
/// task switch; `epoch` tells results of the previous task apart.
pub(crate) struct SessionState {
    pub epoch: u64,
    pub task_id: Option<String>,
    pub transcript: TranscriptDocument,
    pub artifacts: HashMap<String, ArtifactDraft>,
    /// Artifact ids in the order they were first observed.
    pub order: Vec<String>,
    pub active_artifact: Option<String>,
    pub focus: FocusRouter,
    slots: SaveSlots,
    history_capacity: usize,
    events: Vec<SessionEvent>,
    /// Flushes captured at a task switch for keys that still had a save in
    /// flight. Sent once that save resolves. Survives `reset`.
    orphaned: HashMap<(u64, DocKey), SaveRequest>,
}

impl SessionState {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            epoch: 0,
            task_id: None,
            transcript: TranscriptDocument::new(Vec::new(), history_capacity),
            artifacts: HashMap::new(),
            order: Vec::new(),
            active_artifact: None,
            focus: FocusRouter::new(),
            slots: SaveSlots::default(),
            history_capacity,
            events: Vec::new(),
            orphaned: HashMap::new(),
        }
    }

    /// Drops all per-task state and starts `task_id` (or nothing). Returns the
    /// task that was open before.
    pub fn reset(&mut self, task_id: Option<String>) -> Option<String> {
        let previous = self.task_id.take();
        let epoch = self.epoch + 1;
        let events = std::mem::take(&mut self.events);
        let orphaned = std::mem::take(&mut self.orphaned);

        *self = Self::new(self.history_capacity);
        self.epoch = epoch;
        self.events = events;
        self.orphaned = orphaned;
        self.task_id = task_id.clone();

        if let Some(previous) = &previous {
            self.events.push(SessionEvent::TaskClosed {
                task_id: previous.clone(),
            });
        }
        if let Some(task_id) = task_id {
            self.events.push(SessionEvent::TaskOpened { task_id });
        }
        previous
    }

    pub fn require_task(&self) -> crate::Result<&str> {
        self.task_id.as_deref().ok_or(crate::Error::NoOpenTask)
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn tracker(&self, key: &DocKey) -> Option<&DirtyTracker> {
        match key {
            DocKey::Transcript => Some(self.transcript.tracker()),
            DocKey::Artifact { id } => self.artifacts.get(id).map(ArtifactDraft::tracker),
        }
    }

    pub fn tracker_mut(&mut self, key: &DocKey) -> Option<&mut DirtyTracker> {
        match key {
            DocKey::Transcript => Some(self.transcript.tracker_mut()),
            DocKey::Artifact { id } => self.artifacts.get_mut(id).map(ArtifactDraft::tracker_mut),
        }
    }

    pub fn draft(&self, id: &str) -> crate::Result<&ArtifactDraft> {
        self.artifacts
            .get(id)
            .ok_or_else(|| crate::Error::UnknownArtifact(id.to_string()))
    }

    pub fn visible_draft_mut(&mut self, id: &str) -> crate::Result<&mut ArtifactDraft> {
        let draft = self
            .artifacts
            .get_mut(id)
            .ok_or_else(|| crate::Error::UnknownArtifact(id.to_string()))?;
        if !draft.is_visible() {
            return Err(crate::Error::ArtifactHidden(id.to_string()));
        }
        Ok(draft)
    }

    pub fn visible_ids(&self) -> impl Iterator<Item = &String> {
        self.order
            .iter()
            .filter(|id| self.artifacts.get(*id).is_some_and(ArtifactDraft::is_visible))
    }

    /// Every document with unsaved edits, hidden drafts included.
    pub fn dirty_keys(&self) -> Vec<DocKey> {
        let mut keys = Vec::new();
        if self.task_id.is_none() {
            return keys;
        }
        if self.transcript.tracker().is_dirty() {
            keys.push(DocKey::Transcript);
        }
        for id in &self.order {
            if self.artifacts.get(id).is_some_and(|d| d.tracker().is_dirty()) {
                keys.push(DocKey::artifact(id.clone()));
            }
        }
        keys
    }

    /// Creates the draft the first time `meta` is observed; a hidden draft
    /// seen again becomes visible.
    pub fn observe_artifact(&mut self, meta: ArtifactMeta) {
        let id = meta.artifact_id.clone();
        match self.artifacts.get_mut(&id) {
            Some(draft) => draft.set_visible(true),
            None => {
                self.artifacts.insert(id.clone(), ArtifactDraft::new(meta));
                self.order.push(id);
            }
        }
    }

    /// Keeps `active_artifact` pointing at a visible draft.
    pub fn ensure_active(&mut self) {
        let active_visible = self
            .active_artifact
            .as_ref()
            .and_then(|id| self.artifacts.get(id))
            .is_some_and(ArtifactDraft::is_visible);
        if !active_visible {
            let first = self.visible_ids().next().cloned();
            self.active_artifact = first;
        }
    }

    pub fn push_status(&mut self, key: &DocKey) {
        if let Some(tracker) = self.tracker(key) {
            let event = SessionEvent::StatusChanged {
                key: key.clone(),
                dirty: tracker.is_dirty(),
                status: tracker.status(),
                confirmed: tracker.is_confirmed(),
            };
            self.events.push(event);
        }
    }

    pub fn push_history(&mut self) {
        let history = self.transcript.history();
        let event = SessionEvent::HistoryChanged {
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
        };
        self.events.push(event);
    }

    pub fn push_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    fn payload(&self, key: &DocKey, task_id: String) -> SavePayload {
        match key {
            DocKey::Transcript => {
                let renames = self.transcript.pending_renames();
                SavePayload::Transcript(TranscriptSave {
                    task_id,
                    corrected_text: self.transcript.corrected_text(),
                    speaker_renames: (!renames.is_empty()).then(|| renames.clone()),
                })
            }
            DocKey::Artifact { id } => SavePayload::Artifact {
                artifact_id: id.clone(),
                content: self
                    .artifacts
                    .get(id)
                    .map(|d| d.content().to_string())
                    .unwrap_or_default(),
            },
        }
    }

    pub fn begin_save(&mut self, key: &DocKey) -> BeginSave {
        let Some(task_id) = self.task_id.clone() else {
            return BeginSave::Idle(SaveStatus::Saved);
        };
        let Some(tracker) = self.tracker(key) else {
            return BeginSave::Idle(SaveStatus::Saved);
        };
        if !tracker.is_dirty() {
            return BeginSave::Idle(tracker.status());
        }
        if !self.slots.try_begin(key) {
            tracing::debug!(key = %key, "save_deferred");
            return BeginSave::Deferred;
        }

        let payload = self.payload(key, task_id);
        let Some(tracker) = self.tracker_mut(key) else {
            return BeginSave::Idle(SaveStatus::Saved);
        };
        tracker.mark_saving();
        let revision = tracker.revision();
        self.push_status(key);

        BeginSave::Started(SaveRequest {
            key: key.clone(),
            epoch: self.epoch,
            revision,
            payload,
        })
    }

    /// Captures every dirty document of the open task before a switch.
    /// Returns the saves that can start right away; keys with a save in
    /// flight are parked until it resolves.
    pub fn capture_flushes(&mut self) -> Vec<SaveRequest> {
        let mut ready = Vec::new();
        for key in self.dirty_keys() {
            match self.begin_save(&key) {
                BeginSave::Started(request) => ready.push(request),
                BeginSave::Deferred => {
                    let Some(task_id) = self.task_id.clone() else {
                        continue;
                    };
                    let revision = self.tracker(&key).map_or(0, DirtyTracker::revision);
                    let request = SaveRequest {
                        key: key.clone(),
                        epoch: self.epoch,
                        revision,
                        payload: self.payload(&key, task_id),
                    };
                    self.orphaned.insert((self.epoch, key), request);
                }
                BeginSave::Idle(_) => {}
            }
        }
        ready
    }

    /// Applies a save outcome. Returns the resulting status and the save that
    /// must go out next for the same key, if any.
    pub fn finish_save(
        &mut self,
        request: &SaveRequest,
        result: Result<(), RuntimeError>,
    ) -> (SaveStatus, Option<SaveRequest>) {
        let outcome = if result.is_ok() {
            SaveStatus::Saved
        } else {
            SaveStatus::Error
        };
        if request.epoch != self.epoch {
            if let Err(error) = &result {
                tracing::warn!(key = %request.key, error = %error, "save_failed_after_switch");
            }
            let next = self.orphaned.remove(&(request.epoch, request.key.clone()));
            return (outcome, next);
        }

        let trailing = self.slots.finish(&request.key);

        match result {
            Ok(()) => {
                match (&request.key, &request.payload) {
                    (DocKey::Transcript, SavePayload::Transcript(save)) => {
                        if let Some(sent) = &save.speaker_renames {
                            self.transcript.acknowledge_renames(sent);
                        }
                        self.transcript.gate_mut().mark_synced();
                    }
                    (DocKey::Artifact { id }, _) => {
                        if let Some(draft) = self.artifacts.get_mut(id) {
                            draft.gate_mut().mark_synced();
                        }
                    }
                    _ => {}
                }
                if let Some(tracker) = self.tracker_mut(&request.key) {
                    tracker.mark_saved_through(request.revision);
                }
                tracing::info!(key = %request.key, revision = request.revision, "save_succeeded");
            }
            Err(error) => {
                if let Some(tracker) = self.tracker_mut(&request.key) {
                    tracker.mark_error();
                }
                tracing::warn!(key = %request.key, error = %error, "save_failed");
                self.events.push(SessionEvent::SaveFailed {
                    key: request.key.clone(),
                    error: error.to_string(),
                });
            }
        }

        self.push_status(&request.key);
        let status = self
            .tracker(&request.key)
            .map(DirtyTracker::status)
            .unwrap_or(outcome);

        let next = if trailing {
            match self.begin_save(&request.key) {
                BeginSave::Started(next) => Some(next),
                BeginSave::Deferred | BeginSave::Idle(_) => None,
            }
        } else {
            None
        };
        (status, next)
    }
}
