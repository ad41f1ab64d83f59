use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::task::JoinHandle;
use tracing::Instrument;

use hypr_review_document::{
    ArtifactMeta, DiscardReason, Dispatch, DocKey, FocusScope, HistoryStack, KeyEvent, KeyOutcome,
    Paragraph, Reconcile, RenameScope, SaveStatus, Shortcut, TranscriptSnapshot, minutes,
};

use crate::config::SyncConfig;
use crate::events::SessionEvent;
use crate::runtime::WorkspaceRuntime;
use crate::scheduler::{BeginSave, SaveRequest, persist};
use crate::state::SessionState;
use crate::timer::TimerTable;
use crate::view::{DocumentStatus, WorkspaceView};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TimerKey {
    History,
    Save(DocKey),
}

struct Inner {
    runtime: Arc<dyn WorkspaceRuntime>,
    config: SyncConfig,
    state: Mutex<SessionState>,
    timers: TimerTable<TimerKey>,
}

pub(crate) fn session_span(task_id: &str) -> tracing::Span {
    tracing::info_span!("session", task_id = %task_id)
}

/// Edit synchronization for the review workspace of one open task.
///
/// Cheap to clone; clones share state. Every entry point is synchronous
/// except fetching and explicit saves, and none of them block on the network
/// for edits: persistence runs on debounce timers or on spawned tasks. Must be
/// used from within a tokio runtime.
///
/// Dropping the last handle cancels every pending timer without flushing;
/// call [`close`](Self::close) first to persist outstanding edits.
#[derive(Clone)]
pub struct WorkspaceSession {
    inner: Arc<Inner>,
}

impl WorkspaceSession {
    pub fn builder(runtime: impl WorkspaceRuntime) -> WorkspaceSessionBuilder {
        WorkspaceSessionBuilder {
            runtime: Arc::new(runtime),
            config: None,
        }
    }

    pub fn new(runtime: impl WorkspaceRuntime) -> Self {
        Self::builder(runtime).build()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` under the state lock, then hands the events it produced to
    /// the runtime once the lock is released.
    fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (result, events) = {
            let mut state = self.lock();
            let result = f(&mut state);
            (result, state.take_events())
        };
        for event in events {
            self.inner.runtime.emit(event);
        }
        result
    }

    fn span(&self) -> tracing::Span {
        let state = self.lock();
        session_span(state.task_id.as_deref().unwrap_or_default())
    }

    fn from_weak(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    // Lifecycle

    /// Makes `task_id` the open task. Dirty documents of the previous task
    /// are flushed in the background; its timers are cancelled and all of its
    /// state is dropped before the new task's documents exist.
    pub fn open(&self, task_id: impl Into<String>) {
        self.switch(Some(task_id.into()));
    }

    /// Flushes and drops the open task.
    pub fn close(&self) {
        self.switch(None);
    }

    pub fn task_id(&self) -> Option<String> {
        self.lock().task_id.clone()
    }

    fn switch(&self, next: Option<String>) {
        let span = self.span();
        let cancelled = self.inner.timers.cancel_all();
        let (flushes, previous) = self.with_state(|state| {
            let flushes = state.capture_flushes();
            let previous = state.reset(next.clone());
            (flushes, previous)
        });

        tracing::info!(
            previous = previous.as_deref().unwrap_or_default(),
            next = next.as_deref().unwrap_or_default(),
            cancelled_timers = cancelled,
            flushed = flushes.len(),
            "task_switched"
        );

        for request in flushes {
            self.spawn_drive(request, span.clone());
        }
    }

    // Loading

    /// Fetches the transcript of the open task and hydrates it unless local
    /// content already reflects the server or has unsaved edits.
    pub async fn load_transcript(&self) -> crate::Result<Reconcile> {
        let (task_id, epoch) = self.with_state(|state| {
            let task_id = state.require_task()?.to_string();
            Ok::<_, crate::Error>((task_id, state.epoch))
        })?;

        let paragraphs = self
            .inner
            .runtime
            .fetch_transcript(&task_id)
            .instrument(session_span(&task_id))
            .await
            .map_err(|e| crate::Error::Fetch {
                key: DocKey::Transcript,
                message: e.to_string(),
            })?;

        let decision = self.with_state(|state| {
            if state.epoch != epoch {
                return Reconcile::Discard(DiscardReason::StaleTask);
            }
            let transcript = &mut state.transcript;
            let decision = transcript.gate().decide(transcript.tracker().is_dirty());
            if decision == Reconcile::Apply {
                transcript.hydrate(paragraphs);
                state.push_status(&DocKey::Transcript);
                state.push_history();
            }
            state.push_event(remote_event(DocKey::Transcript, decision));
            decision
        });

        if decision == Reconcile::Apply {
            self.inner.timers.cancel(&TimerKey::History);
            self.inner.timers.cancel(&TimerKey::Save(DocKey::Transcript));
        }
        log_reconcile(&DocKey::Transcript, decision);
        Ok(decision)
    }

    /// Fetches one artifact's content. Structured minutes are rendered to
    /// markdown before they reach the draft.
    pub async fn load_artifact(&self, artifact_id: &str) -> crate::Result<Reconcile> {
        let key = DocKey::artifact(artifact_id);
        let (task_id, epoch) = self.with_state(|state| {
            let task_id = state.require_task()?.to_string();
            state.draft(artifact_id)?;
            Ok::<_, crate::Error>((task_id, state.epoch))
        })?;

        let raw = self
            .inner
            .runtime
            .fetch_artifact(artifact_id)
            .instrument(session_span(&task_id))
            .await
            .map_err(|e| crate::Error::Fetch {
                key: key.clone(),
                message: e.to_string(),
            })?;
        let content = minutes::to_markdown(&raw);

        let decision = self.with_state(|state| {
            if state.epoch != epoch {
                return Reconcile::Discard(DiscardReason::StaleTask);
            }
            let Some(draft) = state.artifacts.get_mut(artifact_id) else {
                return Reconcile::Discard(DiscardReason::StaleTask);
            };
            let decision = draft.gate().decide(draft.tracker().is_dirty());
            if decision == Reconcile::Apply {
                draft.hydrate(content);
                state.push_status(&key);
            }
            state.push_event(remote_event(key.clone(), decision));
            decision
        });

        if decision == Reconcile::Apply {
            self.inner.timers.cancel(&TimerKey::Save(key.clone()));
        }
        log_reconcile(&key, decision);
        Ok(decision)
    }

    // Artifacts

    /// Observes the task's artifact list. New ids get an empty draft, hidden
    /// ones listed again become visible. The first visible artifact becomes
    /// active when none is.
    pub fn register_artifacts(
        &self,
        artifacts: impl IntoIterator<Item = ArtifactMeta>,
    ) -> crate::Result<()> {
        self.with_state(|state| {
            state.require_task()?;
            for meta in artifacts {
                state.observe_artifact(meta);
            }
            state.ensure_active();
            Ok::<_, crate::Error>(())
        })
    }

    /// Observes a freshly generated version and switches to it.
    pub fn add_artifact_version(&self, meta: ArtifactMeta) -> crate::Result<()> {
        let id = meta.artifact_id.clone();
        self.with_state(|state| {
            state.require_task()?;
            state.observe_artifact(meta);
            Ok::<_, crate::Error>(())
        })?;
        self.set_active_artifact(&id)
    }

    pub fn active_artifact(&self) -> Option<String> {
        self.lock().active_artifact.clone()
    }

    /// Switches the displayed artifact. The new one may be re-hydrated by the
    /// next fetch; the previous one is flushed when it has unsaved edits and
    /// `flush_on_artifact_switch` is set.
    pub fn set_active_artifact(&self, artifact_id: &str) -> crate::Result<()> {
        let previous = self.with_state(|state| {
            state.require_task()?;
            let draft = state.visible_draft_mut(artifact_id)?;
            draft.gate_mut().invalidate();
            let previous = state.active_artifact.replace(artifact_id.to_string());
            Ok::<_, crate::Error>(previous.filter(|id| id != artifact_id))
        })?;

        if let Some(previous) = previous {
            tracing::debug!(from = %previous, to = %artifact_id, "artifact_switched");
            if self.inner.config.flush_on_artifact_switch {
                self.flush_now(DocKey::artifact(previous));
            }
        }
        Ok(())
    }

    /// Removes an artifact from the visible set. Its draft is kept, and
    /// flushed if dirty.
    pub fn hide_artifact(&self, artifact_id: &str) -> crate::Result<()> {
        let dirty = self.with_state(|state| {
            state.require_task()?;
            let draft = state
                .artifacts
                .get_mut(artifact_id)
                .ok_or_else(|| crate::Error::UnknownArtifact(artifact_id.to_string()))?;
            draft.set_visible(false);
            let dirty = draft.tracker().is_dirty();
            state.ensure_active();
            Ok::<_, crate::Error>(dirty)
        })?;

        if dirty {
            self.flush_now(DocKey::artifact(artifact_id));
        }
        Ok(())
    }

    // Edits

    pub fn update_paragraph_text(&self, paragraph_id: &str, text: &str) -> crate::Result<()> {
        let changed = self.with_state(|state| {
            state.require_task()?;
            let changed = state
                .transcript
                .set_text(paragraph_id, text)
                .ok_or_else(|| crate::Error::UnknownParagraph(paragraph_id.to_string()))?;
            if changed {
                state.push_status(&DocKey::Transcript);
                state.push_history();
            }
            Ok::<_, crate::Error>(changed)
        })?;

        if changed {
            self.transcript_edited();
        }
        Ok(())
    }

    pub fn rename_speaker(&self, from: &str, to: &str, scope: RenameScope) -> crate::Result<()> {
        let changed = self.with_state(|state| {
            state.require_task()?;
            if let RenameScope::Single { paragraph_id } = &scope
                && !state.transcript.paragraphs().iter().any(|p| p.id == *paragraph_id)
            {
                return Err(crate::Error::UnknownParagraph(paragraph_id.clone()));
            }
            let changed = state
                .transcript
                .rename_speaker(from, to, &scope)
                .unwrap_or_default();
            if changed {
                state.push_status(&DocKey::Transcript);
                state.push_history();
            }
            Ok::<_, crate::Error>(changed)
        })?;

        if changed {
            tracing::debug!(from = %from, to = %to, scope = ?scope, "speaker_renamed");
            self.transcript_edited();
        }
        Ok(())
    }

    pub fn update_artifact_content(&self, artifact_id: &str, content: &str) -> crate::Result<()> {
        let key = DocKey::artifact(artifact_id);
        let changed = self.with_state(|state| {
            state.require_task()?;
            let changed = state.visible_draft_mut(artifact_id)?.set_content(content);
            if changed {
                state.push_status(&key);
            }
            Ok::<_, crate::Error>(changed)
        })?;

        if changed {
            self.schedule_save(key);
        }
        Ok(())
    }

    fn transcript_edited(&self) {
        self.arm_history();
        self.schedule_save(DocKey::Transcript);
    }

    // History

    fn arm_history(&self) {
        let weak = Arc::downgrade(&self.inner);
        let span = self.span();
        self.inner.timers.arm(
            TimerKey::History,
            self.inner.config.history_coalesce(),
            async move {
                if let Some(session) = Self::from_weak(&weak) {
                    session.commit_history();
                }
            }
            .instrument(span),
        );
    }

    fn commit_history(&self) {
        self.with_state(|state| {
            if state.transcript.history_mut().settle() {
                tracing::debug!(
                    past = state.transcript.history().past_len(),
                    "history_committed"
                );
                state.push_history();
            }
        });
    }

    /// Returns whether anything was undone.
    pub fn undo(&self) -> bool {
        self.step_history(|history| history.undo())
    }

    /// Returns whether anything was redone.
    pub fn redo(&self) -> bool {
        self.step_history(|history| history.redo())
    }

    fn step_history(
        &self,
        step: impl FnOnce(&mut HistoryStack<TranscriptSnapshot>) -> Option<TranscriptSnapshot>,
    ) -> bool {
        self.inner.timers.cancel(&TimerKey::History);
        let applied = self.with_state(|state| {
            let Some(snapshot) = step(state.transcript.history_mut()) else {
                return false;
            };
            state.transcript.restore(snapshot);
            state.push_status(&DocKey::Transcript);
            state.push_history();
            true
        });
        if applied {
            self.schedule_save(DocKey::Transcript);
        }
        applied
    }

    pub fn can_undo(&self) -> bool {
        self.lock().transcript.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.lock().transcript.history().can_redo()
    }

    // Saving

    /// (Re)arms the debounce timer for `key`. Edits call this themselves.
    pub fn schedule_save(&self, key: DocKey) {
        let weak = Arc::downgrade(&self.inner);
        let span = self.span();
        let target = key.clone();
        tracing::debug!(key = %key, "save_scheduled");
        self.inner.timers.arm(
            TimerKey::Save(key),
            self.inner.config.save_debounce(),
            async move {
                if let Some(session) = Self::from_weak(&weak) {
                    session.save(&target).await;
                }
            }
            .instrument(span),
        );
    }

    /// Saves `key` now and waits for the outcome. A clean document makes no
    /// call. If a save for the key is already in flight this one runs right
    /// after it and `Saving` is returned immediately.
    ///
    /// The request runs on its own task, so dropping the returned future
    /// does not abandon the save.
    pub async fn save(&self, key: &DocKey) -> SaveStatus {
        self.inner.timers.cancel(&TimerKey::Save(key.clone()));
        match self.with_state(|state| state.begin_save(key)) {
            BeginSave::Started(request) => {
                let span = self.span();
                match self.spawn_drive(request, span).await {
                    Ok(status) => status,
                    Err(error) => {
                        tracing::error!(key = %key, error = %error, "save_task_failed");
                        SaveStatus::Error
                    }
                }
            }
            BeginSave::Deferred => SaveStatus::Saving,
            BeginSave::Idle(status) => status,
        }
    }

    /// Starts a save for `key` in the background, bypassing the debounce.
    pub fn flush_now(&self, key: DocKey) {
        self.inner.timers.cancel(&TimerKey::Save(key.clone()));
        if let BeginSave::Started(request) = self.with_state(|state| state.begin_save(&key)) {
            let span = self.span();
            self.spawn_drive(request, span);
        }
    }

    /// Flushes every dirty document, hidden drafts included.
    pub fn flush_all(&self) {
        let keys = self.lock().dirty_keys();
        for key in keys {
            self.flush_now(key);
        }
    }

    fn spawn_drive(&self, request: SaveRequest, span: tracing::Span) -> JoinHandle<SaveStatus> {
        let session = self.clone();
        tokio::spawn(async move { session.drive(request).await }.instrument(span))
    }

    /// Sends `request`, then whatever became due for the same key while it
    /// was in flight.
    async fn drive(&self, mut request: SaveRequest) -> SaveStatus {
        loop {
            tracing::info!(key = %request.key, revision = request.revision, "save_started");
            let result = persist(self.inner.runtime.as_ref(), &request.payload).await;
            let (status, next) = self.with_state(|state| state.finish_save(&request, result));
            match next {
                Some(next) => request = next,
                None => return status,
            }
        }
    }

    pub fn status(&self, key: &DocKey) -> Option<DocumentStatus> {
        self.lock().tracker(key).map(DocumentStatus::from)
    }

    // Focus and keyboard

    pub fn focus_enter(&self, scope: FocusScope) {
        self.lock().focus.enter(scope);
    }

    pub fn focus_leave(&self, scope: FocusScope) {
        self.lock().focus.leave(scope);
    }

    /// Routes a window-level keydown. `closest` is the region around the
    /// focused element at keypress time, if the UI could determine it.
    ///
    /// Transcript undo/redo and all saves are carried out here; artifact
    /// undo/redo is left to the rich editor.
    pub fn handle_key(&self, event: &KeyEvent, closest: Option<FocusScope>) -> KeyOutcome {
        let (outcome, active) = {
            let state = self.lock();
            (state.focus.handle_key(event, closest), state.active_artifact.clone())
        };

        match outcome.dispatch {
            Some(Dispatch::Transcript { shortcut }) => match shortcut {
                Shortcut::Save => self.flush_now(DocKey::Transcript),
                Shortcut::Undo => {
                    self.undo();
                }
                Shortcut::Redo => {
                    self.redo();
                }
            },
            Some(Dispatch::Artifact {
                shortcut: Shortcut::Save,
            }) => {
                if let Some(id) = active {
                    self.flush_now(DocKey::artifact(id));
                }
            }
            Some(Dispatch::Artifact { .. }) => {}
            Some(Dispatch::SaveAll) => self.flush_all(),
            Some(Dispatch::NoTarget { shortcut }) => {
                tracing::debug!(shortcut = ?shortcut, "shortcut_without_target");
            }
            None => {}
        }
        outcome
    }

    // Review and read access

    /// Marks a document as reviewed. The next edit clears it.
    pub fn set_confirmed(&self, key: &DocKey, confirmed: bool) -> crate::Result<()> {
        self.with_state(|state| {
            state.require_task()?;
            let tracker = state
                .tracker_mut(key)
                .ok_or_else(|| unknown_artifact(key))?;
            tracker.set_confirmed(confirmed);
            state.push_status(key);
            Ok::<_, crate::Error>(())
        })
    }

    /// The document as it would be exported: corrected transcript text or
    /// artifact markdown. Only reviewed documents can be exported.
    pub fn export_text(&self, key: &DocKey) -> crate::Result<String> {
        let state = self.lock();
        state.require_task()?;
        let tracker = state.tracker(key).ok_or_else(|| unknown_artifact(key))?;
        if !tracker.is_confirmed() {
            return Err(crate::Error::NotConfirmed(key.clone()));
        }
        match key {
            DocKey::Transcript => Ok(state.transcript.corrected_text()),
            DocKey::Artifact { id } => Ok(state.draft(id)?.content().to_string()),
        }
    }

    pub fn transcript(&self) -> Vec<Paragraph> {
        self.lock().transcript.paragraphs().to_vec()
    }

    pub fn artifact_content(&self, artifact_id: &str) -> Option<String> {
        self.lock()
            .artifacts
            .get(artifact_id)
            .map(|draft| draft.content().to_string())
    }

    pub fn view(&self) -> WorkspaceView {
        WorkspaceView::from_state(&self.lock())
    }
}

fn unknown_artifact(key: &DocKey) -> crate::Error {
    crate::Error::UnknownArtifact(key.artifact_id().unwrap_or_default().to_string())
}

fn remote_event(key: DocKey, decision: Reconcile) -> SessionEvent {
    match decision {
        Reconcile::Apply => SessionEvent::RemoteApplied { key },
        Reconcile::Discard(reason) => SessionEvent::RemoteDiscarded { key, reason },
    }
}

fn log_reconcile(key: &DocKey, decision: Reconcile) {
    match decision {
        Reconcile::Apply => tracing::info!(key = %key, "remote_applied"),
        Reconcile::Discard(reason) => {
            tracing::warn!(key = %key, reason = ?reason, "remote_discarded")
        }
    }
}

pub struct WorkspaceSessionBuilder {
    runtime: Arc<dyn WorkspaceRuntime>,
    config: Option<SyncConfig>,
}

impl WorkspaceSessionBuilder {
    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> WorkspaceSession {
        let config = self.config.unwrap_or_default();
        WorkspaceSession {
            inner: Arc::new(Inner {
                runtime: self.runtime,
                state: Mutex::new(SessionState::new(config.history_capacity)),
                config,
                timers: TimerTable::new(),
            }),
        }
    }
}
