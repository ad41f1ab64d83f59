use std::collections::BTreeMap;
use std::fmt;

/// Old speaker label → new speaker label, accumulated by global renames.
pub type SpeakerRenames = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct Paragraph {
    #[serde(rename = "paragraph_id")]
    pub id: String,
    pub speaker: String,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl Paragraph {
    pub fn new(id: impl Into<String>, speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            speaker: speaker.into(),
            text: text.into(),
            start_time: 0.0,
            end_time: 0.0,
        }
    }

    pub fn with_times(mut self, start_time: f64, end_time: f64) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// One line of the corrected transcript sent back to the server.
    pub fn corrected_line(&self) -> String {
        format!("[{}] {}", self.speaker, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct ArtifactMeta {
    pub artifact_id: String,
    pub artifact_type: String,
    pub version: u32,
}

impl ArtifactMeta {
    pub fn new(
        artifact_id: impl Into<String>,
        artifact_type: impl Into<String>,
        version: u32,
    ) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            artifact_type: artifact_type.into(),
            version,
        }
    }

    pub fn label(&self) -> String {
        format!("{} v{}", self.artifact_type, self.version)
    }
}

/// Identifies one editable document of the open task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type")]
pub enum DocKey {
    #[serde(rename = "transcript")]
    Transcript,
    #[serde(rename = "artifact")]
    Artifact { id: String },
}

impl DocKey {
    pub fn artifact(id: impl Into<String>) -> Self {
        Self::Artifact { id: id.into() }
    }

    pub fn artifact_id(&self) -> Option<&str> {
        match self {
            Self::Transcript => None,
            Self::Artifact { id } => Some(id),
        }
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transcript => f.write_str("transcript"),
            Self::Artifact { id } => write!(f, "artifact:{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Saved,
    Saving,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type")]
pub enum RenameScope {
    #[serde(rename = "single")]
    Single { paragraph_id: String },
    #[serde(rename = "global")]
    Global,
}
