/// Whether local content already reflects the server for the current remote
/// version. Once set, later fetch results are dropped until the gate is
/// invalidated (task load, artifact switch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchGate {
    synced_since_fetch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub enum DiscardReason {
    AlreadySynced,
    LocalEdits,
    StaleTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    Apply,
    Discard(DiscardReason),
}

impl FetchGate {
    pub fn is_synced(&self) -> bool {
        self.synced_since_fetch
    }

    pub fn mark_synced(&mut self) {
        self.synced_since_fetch = true;
    }

    pub fn invalidate(&mut self) {
        self.synced_since_fetch = false;
    }

    /// Decides what to do with a fetch result that just resolved.
    ///
    /// Unsaved local edits are never overwritten, even on an invalidated
    /// gate: switching artifacts clears the gate but must not throw away a
    /// draft that has not reached the server yet.
    pub fn decide(&self, local_dirty: bool) -> Reconcile {
        if self.synced_since_fetch {
            Reconcile::Discard(DiscardReason::AlreadySynced)
        } else if local_dirty {
            Reconcile::Discard(DiscardReason::LocalEdits)
        } else {
            Reconcile::Apply
        }
    }
}
