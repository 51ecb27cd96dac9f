use crate::record::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Three-state result driving the header checkbox (`Some` renders indeterminate).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStatus {
    None,
    Some,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    selected: BTreeSet<RecordId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership; returns whether `id` is now selected.
    pub fn toggle(&mut self, id: &RecordId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Replaces the selection with exactly `ids`.
    pub fn select_all<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        self.selected = ids.into_iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn selected(&self) -> impl Iterator<Item = &RecordId> {
        self.selected.iter()
    }

    /// Status relative to `candidates`, normally the visible ids.
    pub fn status(&self, candidates: &[RecordId]) -> SelectionStatus {
        let hits = candidates.iter().filter(|id| self.selected.contains(*id)).count();
        if hits == 0 {
            SelectionStatus::None
        } else if hits == candidates.len() {
            SelectionStatus::All
        } else {
            SelectionStatus::Some
        }
    }

    /// Header checkbox: clears when every visible id is selected, otherwise
    /// selects exactly the visible ids. Hidden records are never selected.
    /// With nothing visible the selection is left alone.
    pub fn toggle_all(&mut self, visible: &[RecordId]) -> SelectionStatus {
        if visible.is_empty() {
            return SelectionStatus::None;
        }
        if self.status(visible) == SelectionStatus::All {
            self.clear();
        } else {
            self.select_all(visible);
        }
        self.status(visible)
    }

    /// Drops ids absent from `live`; returns how many were removed.
    pub fn prune<'a, I>(&mut self, live: I) -> usize
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        let live: HashSet<&RecordId> = live.into_iter().collect();
        let before = self.selected.len();
        self.selected.retain(|id| live.contains(id));
        before - self.selected.len()
    }
}
