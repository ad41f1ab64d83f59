use std::collections::VecDeque;

use crate::content::SameContent;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded undo/redo buffer over whole-document snapshots.
///
/// Edits are *staged* on every keystroke and only *settled* into history when
/// the caller's coalescing window closes, so a burst of typing becomes one
/// undo step. The stack itself has no clock; the owner decides when to call
/// [`HistoryStack::settle`].
///
/// `undo`/`redo` return the snapshot to display. Applying it must go through
/// a path that does not [`stage`](HistoryStack::stage) again; if a UI echoes
/// the applied value back as an edit anyway, the structural comparison in
/// `settle` drops it.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    past: VecDeque<T>,
    future: VecDeque<T>,
    present: T,
    pending: Option<T>,
    capacity: usize,
}

impl<T: SameContent + Clone> HistoryStack<T> {
    pub fn new(baseline: T) -> Self {
        Self::with_capacity(baseline, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(baseline: T, capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            present: baseline,
            pending: None,
            capacity: capacity.max(1),
        }
    }

    /// Drops all history and starts over from `baseline`.
    pub fn reset(&mut self, baseline: T) {
        self.past.clear();
        self.future.clear();
        self.pending = None;
        self.present = baseline;
    }

    /// Replaces the pending snapshot. Only the latest staged value survives.
    pub fn stage(&mut self, snapshot: T) {
        self.pending = Some(snapshot);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Commits the pending snapshot. Returns `false` when nothing was
    /// pending or the pending content equals the present.
    pub fn settle(&mut self) -> bool {
        let Some(next) = self.pending.take() else {
            return false;
        };
        if next.same_content(&self.present) {
            return false;
        }

        let previous = std::mem::replace(&mut self.present, next);
        push_bounded(&mut self.past, previous, self.capacity);
        self.future.clear();
        true
    }

    pub fn undo(&mut self) -> Option<T> {
        self.settle();
        let restored = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, restored.clone());
        push_bounded(&mut self.future, current, self.capacity);
        Some(restored)
    }

    pub fn redo(&mut self) -> Option<T> {
        self.settle();
        let restored = self.future.pop_back()?;
        let current = std::mem::replace(&mut self.present, restored.clone());
        push_bounded(&mut self.past, current, self.capacity);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty() || self.pending_differs()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty() && !self.pending_differs()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn pending_differs(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.same_content(&self.present))
    }
}

fn push_bounded<T>(stack: &mut VecDeque<T>, value: T, capacity: usize) {
    if stack.len() == capacity {
        stack.pop_front();
    }
    stack.push_back(value);
}
