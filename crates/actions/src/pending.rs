//! Inverse actions recorded for every successful press

use crate::model::Action;

/// Append-only record of keyUp/pointerUp actions that undo the presses
/// performed so far. Replaying an entry whose input is already released is
/// a no-op, so duplicates are harmless.
#[derive(Debug, Default, Clone)]
pub struct PendingCancellations {
    entries: Vec<Action>,
}

impl PendingCancellations {
    pub fn push(&mut self, inverse: Action) {
        self.entries.push(inverse);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Action] {
        &self.entries
    }

    /// Remove and return every entry in append order.
    pub fn take(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.entries)
    }

    /// Put back entries that were taken but not replayed, ahead of anything
    /// appended in the meantime.
    pub fn restore(&mut self, mut unreplayed: Vec<Action>) {
        unreplayed.append(&mut self.entries);
        self.entries = unreplayed;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
