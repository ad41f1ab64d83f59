use hypr_review_document::{DiscardReason, DocKey, SaveStatus};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    #[serde(rename = "taskOpened")]
    TaskOpened { task_id: String },
    #[serde(rename = "taskClosed")]
    TaskClosed { task_id: String },
    #[serde(rename = "statusChanged")]
    StatusChanged {
        key: DocKey,
        dirty: bool,
        status: SaveStatus,
        confirmed: bool,
    },
    #[serde(rename = "historyChanged")]
    HistoryChanged { can_undo: bool, can_redo: bool },
    #[serde(rename = "saveFailed")]
    SaveFailed { key: DocKey, error: String },
    #[serde(rename = "remoteApplied")]
    RemoteApplied { key: DocKey },
    #[serde(rename = "remoteDiscarded")]
    RemoteDiscarded { key: DocKey, reason: DiscardReason },
}
