//! Selection model for re-importing previously scanned directories

use std::collections::HashSet;
use std::path::PathBuf;

use crate::db::RecordStore;
use crate::error::ImportError;
use crate::models::DirectoryEntry;

/// In-memory list of directory entries with a selection flag.
///
/// The store is the single source of truth: `refresh` always discards
/// and rebuilds the whole list, never merging with prior state.
#[derive(Debug, Default)]
pub struct DirectorySelectionModel {
    entries: Vec<DirectoryEntry>,
}

impl DirectorySelectionModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the entry list from the store's scan history.
    ///
    /// Every new entry starts unselected. Entries are never duplicated
    /// by path within one refresh.
    pub fn refresh(&mut self, store: &impl RecordStore) -> Result<(), ImportError> {
        let roots = store.list_scanned_roots()?;
        let mut seen = HashSet::new();
        self.entries = roots
            .iter()
            .filter(|root| seen.insert(root.path.clone()))
            .map(DirectoryEntry::root)
            .collect();
        Ok(())
    }

    /// Set every entry's selection flag
    pub fn toggle_all(&mut self, selected: bool) {
        for entry in &mut self.entries {
            entry.selected = selected;
        }
    }

    /// Set one entry's selection flag; returns false if out of range
    pub fn set_selected(&mut self, index: usize, selected: bool) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Paths of all selected entries, in list order
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| PathBuf::from(&e.path))
            .collect()
    }

    /// All entries in list order
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete every persisted record and scanned root, then refresh.
    ///
    /// Irreversible. Callers are expected to confirm with the user
    /// before invoking this.
    pub fn clear_all(&mut self, store: &mut impl RecordStore) -> Result<(), ImportError> {
        store.delete_all()?;
        self.refresh(store)
    }
}
