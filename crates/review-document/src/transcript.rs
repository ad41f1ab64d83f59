use crate::content::SameContent;
use crate::dirty::DirtyTracker;
use crate::history::HistoryStack;
use crate::model::{Paragraph, RenameScope, SpeakerRenames};
use crate::reconcile::FetchGate;

/// What the transcript history records. Renames ride along so that redoing a
/// global rename restores the mapping sent to the server, but only the
/// paragraphs take part in equality.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSnapshot {
    pub paragraphs: Vec<Paragraph>,
    pub speaker_renames: SpeakerRenames,
}

impl SameContent for TranscriptSnapshot {
    fn same_content(&self, other: &Self) -> bool {
        self.paragraphs.same_content(&other.paragraphs)
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptDocument {
    paragraphs: Vec<Paragraph>,
    pending_renames: SpeakerRenames,
    tracker: DirtyTracker,
    history: HistoryStack<TranscriptSnapshot>,
    gate: FetchGate,
}

impl TranscriptDocument {
    pub fn new(paragraphs: Vec<Paragraph>, history_capacity: usize) -> Self {
        let baseline = TranscriptSnapshot {
            paragraphs: paragraphs.clone(),
            speaker_renames: SpeakerRenames::new(),
        };
        Self {
            paragraphs,
            pending_renames: SpeakerRenames::new(),
            tracker: DirtyTracker::new(),
            history: HistoryStack::with_capacity(baseline, history_capacity),
            gate: FetchGate::default(),
        }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn pending_renames(&self) -> &SpeakerRenames {
        &self.pending_renames
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DirtyTracker {
        &mut self.tracker
    }

    pub fn history(&self) -> &HistoryStack<TranscriptSnapshot> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStack<TranscriptSnapshot> {
        &mut self.history
    }

    pub fn gate(&self) -> &FetchGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut FetchGate {
        &mut self.gate
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            paragraphs: self.paragraphs.clone(),
            speaker_renames: self.pending_renames.clone(),
        }
    }

    /// Returns `None` when no paragraph has `id`, otherwise whether the text
    /// actually changed.
    pub fn set_text(&mut self, id: &str, text: &str) -> Option<bool> {
        let paragraph = self.paragraphs.iter_mut().find(|p| p.id == id)?;
        if paragraph.text == text {
            return Some(false);
        }
        paragraph.text = text.to_string();
        self.record_edit();
        Some(true)
    }

    /// Returns `None` when a single-scope rename names an unknown paragraph,
    /// otherwise whether anything changed.
    pub fn rename_speaker(&mut self, from: &str, to: &str, scope: &RenameScope) -> Option<bool> {
        let changed = match scope {
            RenameScope::Single { paragraph_id } => {
                let paragraph = self.paragraphs.iter_mut().find(|p| p.id == *paragraph_id)?;
                if paragraph.speaker == to {
                    false
                } else {
                    paragraph.speaker = to.to_string();
                    true
                }
            }
            RenameScope::Global => {
                if from == to {
                    return Some(false);
                }
                for paragraph in self.paragraphs.iter_mut().filter(|p| p.speaker == from) {
                    paragraph.speaker = to.to_string();
                }
                let previous = self.pending_renames.insert(from.to_string(), to.to_string());
                previous.as_deref() != Some(to)
            }
        };

        if changed {
            self.record_edit();
        }
        Some(changed)
    }

    /// Applies an undo/redo result. Does not stage a history entry.
    ///
    /// Pending renames are the union of the current and restored maps, minus
    /// any rename whose old label is still on some paragraph (the rename was
    /// undone).
    pub fn restore(&mut self, snapshot: TranscriptSnapshot) {
        self.paragraphs = snapshot.paragraphs;
        self.pending_renames.extend(snapshot.speaker_renames);
        let paragraphs = &self.paragraphs;
        self.pending_renames
            .retain(|from, _| !paragraphs.iter().any(|p| p.speaker == *from));
        self.tracker.mark_dirty();
    }

    /// Replaces local content with the server's copy and starts a fresh
    /// history from it.
    pub fn hydrate(&mut self, paragraphs: Vec<Paragraph>) {
        self.paragraphs = paragraphs;
        self.pending_renames.clear();
        self.history.reset(self.snapshot());
        self.tracker.mark_hydrated();
        self.gate.mark_synced();
    }

    /// Drops renames the server has accepted. Entries changed after `sent`
    /// was captured stay pending.
    pub fn acknowledge_renames(&mut self, sent: &SpeakerRenames) {
        for (from, to) in sent {
            if self.pending_renames.get(from) == Some(to) {
                self.pending_renames.remove(from);
            }
        }
    }

    /// Paragraphs rendered as `[speaker] text`, one per line.
    pub fn corrected_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::corrected_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn record_edit(&mut self) {
        self.tracker.mark_dirty();
        let snapshot = self.snapshot();
        self.history.stage(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> TranscriptDocument {
        TranscriptDocument::new(
            vec![
                Paragraph::new("p1", "Speaker 1", "hello").with_times(0.0, 2.5),
                Paragraph::new("p2", "Speaker 2", "hi there").with_times(2.5, 4.0),
                Paragraph::new("p3", "Speaker 1", "how are you").with_times(4.0, 6.0),
                Paragraph::new("p4", "Speaker 1", "bye").with_times(6.0, 7.0),
            ],
            50,
        )
    }

    #[test]
    fn set_text_marks_dirty_and_stages() {
        let mut d = doc();
        assert_eq!(d.set_text("p1", "hello world"), Some(true));
        assert!(d.tracker().is_dirty());
        assert!(d.history().has_pending());
    }

    #[test]
    fn same_text_is_noop() {
        let mut d = doc();
        assert_eq!(d.set_text("p1", "hello"), Some(false));
        assert!(!d.tracker().is_dirty());
    }

    #[test]
    fn unknown_paragraph() {
        let mut d = doc();
        assert_eq!(d.set_text("nope", "x"), None);
        assert_eq!(
            d.rename_speaker(
                "A",
                "B",
                &RenameScope::Single {
                    paragraph_id: "nope".into()
                }
            ),
            None
        );
    }

    #[test]
    fn global_rename_touches_every_match() {
        let mut d = doc();
        assert_eq!(
            d.rename_speaker("Speaker 1", "Alice", &RenameScope::Global),
            Some(true)
        );
        let alice = d.paragraphs().iter().filter(|p| p.speaker == "Alice").count();
        assert_eq!(alice, 3);
        assert_eq!(d.pending_renames().get("Speaker 1").map(String::as_str), Some("Alice"));
    }

    #[test]
    fn single_rename_leaves_map_alone() {
        let mut d = doc();
        let scope = RenameScope::Single {
            paragraph_id: "p3".into(),
        };
        assert_eq!(d.rename_speaker("Speaker 1", "Bob", &scope), Some(true));
        assert_eq!(d.paragraphs()[2].speaker, "Bob");
        assert_eq!(d.paragraphs()[0].speaker, "Speaker 1");
        assert!(d.pending_renames().is_empty());
    }

    #[test]
    fn undone_rename_leaves_pending_map() {
        let mut d = doc();
        d.rename_speaker("Speaker 1", "Alice", &RenameScope::Global);
        d.history_mut().settle();
        let restored = d.history_mut().undo().unwrap();
        d.restore(restored);
        assert!(d.pending_renames().is_empty());
        assert_eq!(d.paragraphs()[0].speaker, "Speaker 1");

        let redone = d.history_mut().redo().unwrap();
        d.restore(redone);
        assert_eq!(d.pending_renames().len(), 1);
    }

    #[test]
    fn acknowledge_keeps_newer_renames() {
        let mut d = doc();
        d.rename_speaker("Speaker 1", "Alice", &RenameScope::Global);
        let sent = d.pending_renames().clone();
        d.rename_speaker("Speaker 2", "Bob", &RenameScope::Global);
        d.acknowledge_renames(&sent);
        assert_eq!(d.pending_renames().len(), 1);
        assert!(d.pending_renames().contains_key("Speaker 2"));
    }

    #[test]
    fn hydrate_resets_everything() {
        let mut d = doc();
        d.set_text("p1", "edited");
        d.history_mut().settle();
        d.hydrate(vec![Paragraph::new("p1", "Speaker 1", "server")]);
        assert!(!d.tracker().is_dirty());
        assert!(!d.history().can_undo());
        assert!(d.gate().is_synced());
    }

    #[test]
    fn corrected_text_snapshot() {
        let mut d = doc();
        d.set_text("p1", "hello world");
        d.rename_speaker("Speaker 2", "Alice", &RenameScope::Global);
        insta::assert_snapshot!(d.corrected_text(), @r"
        [Speaker 1] hello world
        [Alice] hi there
        [Speaker 1] how are you
        [Speaker 1] bye
        ");
    }
}
