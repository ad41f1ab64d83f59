use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use review_sync::{
    BoxFuture, DocKey, Paragraph, RuntimeError, SessionEvent, TranscriptSave, WorkspaceRuntime,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SaveCall {
    Transcript(TranscriptSave),
    Artifact { artifact_id: String, content: String },
}

#[derive(Debug, Clone, Default)]
pub struct MockRuntimeConfig {
    pub save_latency: Duration,
    pub fetch_latency: Duration,
}

impl MockRuntimeConfig {
    pub fn save_latency(mut self, latency: Duration) -> Self {
        self.save_latency = latency;
        self
    }

    pub fn fetch_latency(mut self, latency: Duration) -> Self {
        self.fetch_latency = latency;
        self
    }
}

#[derive(Default)]
struct Recorded {
    saves: Vec<SaveCall>,
    events: Vec<SessionEvent>,
    fetches: usize,
    fail_saves: bool,
    transcripts: HashMap<String, Vec<Paragraph>>,
    artifacts: HashMap<String, String>,
    in_flight: HashMap<String, usize>,
    max_in_flight: HashMap<String, usize>,
}

/// In-memory server. Clones share what was recorded, so a test keeps one
/// handle and gives another to the session.
#[derive(Clone, Default)]
pub struct MockRuntime {
    config: MockRuntimeConfig,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockRuntimeConfig) -> Self {
        Self {
            config,
            recorded: Arc::default(),
        }
    }

    pub fn with_transcript(self, task_id: &str, paragraphs: Vec<Paragraph>) -> Self {
        self.recorded
            .lock()
            .unwrap()
            .transcripts
            .insert(task_id.to_string(), paragraphs);
        self
    }

    pub fn with_artifact(self, artifact_id: &str, content: &str) -> Self {
        self.recorded
            .lock()
            .unwrap()
            .artifacts
            .insert(artifact_id.to_string(), content.to_string());
        self
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.recorded.lock().unwrap().fail_saves = fail;
    }

    pub fn saves(&self) -> Vec<SaveCall> {
        self.recorded.lock().unwrap().saves.clone()
    }

    pub fn transcript_saves(&self) -> Vec<TranscriptSave> {
        self.saves()
            .into_iter()
            .filter_map(|call| match call {
                SaveCall::Transcript(save) => Some(save),
                SaveCall::Artifact { .. } => None,
            })
            .collect()
    }

    pub fn artifact_saves(&self, artifact_id: &str) -> Vec<String> {
        self.saves()
            .into_iter()
            .filter_map(|call| match call {
                SaveCall::Artifact {
                    artifact_id: id,
                    content,
                } if id == artifact_id => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn fetches(&self) -> usize {
        self.recorded.lock().unwrap().fetches
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.recorded.lock().unwrap().events.clone()
    }

    pub fn max_in_flight(&self, key: &DocKey) -> usize {
        self.recorded
            .lock()
            .unwrap()
            .max_in_flight
            .get(&key.to_string())
            .copied()
            .unwrap_or_default()
    }

    async fn record_save(&self, key: DocKey, call: SaveCall) -> Result<(), RuntimeError> {
        let key = key.to_string();
        {
            let mut recorded = self.recorded.lock().unwrap();
            let count = recorded.in_flight.entry(key.clone()).or_default();
            *count += 1;
            let count = *count;
            let max = recorded.max_in_flight.entry(key.clone()).or_default();
            *max = (*max).max(count);
        }

        tokio::time::sleep(self.config.save_latency).await;

        let mut recorded = self.recorded.lock().unwrap();
        if let Some(count) = recorded.in_flight.get_mut(&key) {
            *count -= 1;
        }
        if recorded.fail_saves {
            return Err(format!("save rejected for {key}").into());
        }
        if let SaveCall::Artifact {
            artifact_id,
            content,
        } = &call
        {
            recorded
                .artifacts
                .insert(artifact_id.clone(), content.clone());
        }
        recorded.saves.push(call);
        Ok(())
    }
}

impl WorkspaceRuntime for MockRuntime {
    fn save_transcript<'a>(
        &'a self,
        save: &'a TranscriptSave,
    ) -> BoxFuture<'a, Result<(), RuntimeError>> {
        Box::pin(self.record_save(DocKey::Transcript, SaveCall::Transcript(save.clone())))
    }

    fn save_artifact<'a>(
        &'a self,
        artifact_id: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, Result<(), RuntimeError>> {
        Box::pin(self.record_save(
            DocKey::artifact(artifact_id),
            SaveCall::Artifact {
                artifact_id: artifact_id.to_string(),
                content: content.to_string(),
            },
        ))
    }

    fn fetch_transcript<'a>(
        &'a self,
        task_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Paragraph>, RuntimeError>> {
        Box::pin(async move {
            tokio::time::sleep(self.config.fetch_latency).await;
            let mut recorded = self.recorded.lock().unwrap();
            recorded.fetches += 1;
            recorded
                .transcripts
                .get(task_id)
                .cloned()
                .ok_or_else(|| RuntimeError::from(format!("no transcript for {task_id}")))
        })
    }

    fn fetch_artifact<'a>(
        &'a self,
        artifact_id: &'a str,
    ) -> BoxFuture<'a, Result<String, RuntimeError>> {
        Box::pin(async move {
            tokio::time::sleep(self.config.fetch_latency).await;
            let mut recorded = self.recorded.lock().unwrap();
            recorded.fetches += 1;
            recorded
                .artifacts
                .get(artifact_id)
                .cloned()
                .ok_or_else(|| RuntimeError::from(format!("no artifact {artifact_id}")))
        })
    }

    fn emit(&self, event: SessionEvent) {
        self.recorded.lock().unwrap().events.push(event);
    }
}

pub fn speaker_paragraphs() -> Vec<Paragraph> {
    vec![
        Paragraph::new("p1", "Speaker 1", "hello").with_times(0.0, 1.5),
        Paragraph::new("p2", "Speaker 1", "how are you").with_times(1.5, 3.0),
        Paragraph::new("p3", "Speaker 2", "fine thanks").with_times(3.0, 4.2),
        Paragraph::new("p4", "Speaker 1", "great").with_times(4.2, 5.0),
    ]
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
