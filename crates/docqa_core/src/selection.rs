use std::collections::BTreeSet;

use crate::{DocumentId, DocumentRegistry};

/// Documents the user picked to scope questions.
///
/// Only `toggle` and `reconcile` mutate it; everything else reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    ids: BTreeSet<DocumentId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it if present.
    /// Ids the registry does not know are never added.
    pub fn toggle(&mut self, id: DocumentId, registry: &DocumentRegistry) -> bool {
        if self.ids.remove(&id) {
            return true;
        }
        if !registry.contains(id) {
            return false;
        }
        self.ids.insert(id);
        true
    }

    /// Drops ids that are no longer in the registry. Returns how many were pruned.
    pub fn reconcile(&mut self, registry: &DocumentRegistry) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| registry.contains(*id));
        before - self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &BTreeSet<DocumentId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The sole member, if exactly one document is selected.
    pub fn single(&self) -> Option<DocumentId> {
        if self.ids.len() == 1 {
            self.ids.iter().next().copied()
        } else {
            None
        }
    }
}
