use hypr_review_document::DocKey;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no task is open")]
    NoOpenTask,
    #[error("paragraph not found: {0}")]
    UnknownParagraph(String),
    #[error("artifact not found: {0}")]
    UnknownArtifact(String),
    #[error("artifact is hidden: {0}")]
    ArtifactHidden(String),
    #[error("{0} has not been confirmed")]
    NotConfirmed(DocKey),
    #[error("fetch for {key} failed: {message}")]
    Fetch { key: DocKey, message: String },
    #[error(transparent)]
    Config(#[from] envy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
