//! Row selection.
//!
//! A [`RowSelectionModel`] is the set of selected row ids. It is unordered
//! and compares by value, so two models holding the same ids are equal no
//! matter how they were built.
//!
//! # Example
//!
//! ```
//! use lattice_grid::model::{RowId, RowSelectionModel, SelectAllState};
//!
//! let visible = [RowId::from(1), RowId::from(2)];
//! let mut selection = RowSelectionModel::new();
//!
//! selection.toggle(RowId::from(1));
//! assert_eq!(selection.select_all_state(&visible), SelectAllState::Some);
//!
//! selection.select_all_visible(&visible);
//! assert_eq!(selection.select_all_state(&visible), SelectAllState::All);
//!
//! // A second click on the header checkbox clears everything.
//! selection.select_all_visible(&visible);
//! assert!(selection.is_empty());
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::row::RowId;

/// Set of selected row ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSelectionModel {
    ids: HashSet<RowId>,
}

/// State of the header "select all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    /// No visible row is selected.
    None,
    /// Some, but not all, visible rows are selected (indeterminate).
    Some,
    /// Every visible row is selected.
    All,
}

impl RowSelectionModel {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns `true` if `id` is selected.
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates over the selected ids in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &RowId> {
        self.ids.iter()
    }

    /// Returns the selected ids sorted, for stable display and logging.
    pub fn sorted_ids(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns `true` when the selection is exactly `visible`.
    pub fn equals_set(&self, visible: &[RowId]) -> bool {
        let visible: HashSet<&RowId> = visible.iter().collect();
        visible.len() == self.ids.len() && self.ids.iter().all(|id| visible.contains(id))
    }

    /// Header checkbox state for the rows currently on screen.
    pub fn select_all_state(&self, visible: &[RowId]) -> SelectAllState {
        let selected = visible.iter().filter(|id| self.ids.contains(*id)).count();
        match selected {
            0 => SelectAllState::None,
            n if n == visible.len() => SelectAllState::All,
            _ => SelectAllState::Some,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `id` if absent, removes it if present.
    pub fn toggle(&mut self, id: RowId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Selects `id`.
    pub fn select(&mut self, id: RowId) {
        self.ids.insert(id);
    }

    /// Header checkbox click.
    ///
    /// If the selection is already exactly the visible rows it is cleared;
    /// otherwise it is replaced by exactly the visible rows. Rows outside the
    /// visible page are never added.
    pub fn select_all_visible(&mut self, visible: &[RowId]) {
        if self.equals_set(visible) {
            self.ids.clear();
        } else {
            self.ids = visible.iter().cloned().collect();
        }
    }

    /// Deselects everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl FromIterator<RowId> for RowSelectionModel {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
