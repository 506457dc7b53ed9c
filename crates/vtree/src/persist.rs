#![forbid(unsafe_code)]

//! Saving and restoring the collapsed set.
//!
//! Only collapsed ids are stored. Everything else in a session (matches,
//! selection, viewport) is derived or host-owned.

use std::collections::BTreeSet;

use crate::engine::{TreeHost, VirtualTree};

/// Persistable collapse state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TreePersistState {
    /// Ids of collapsed nodes.
    pub collapsed_ids: BTreeSet<String>,
}

impl<H: TreeHost> VirtualTree<H> {
    /// Snapshot the collapsed set.
    #[must_use]
    pub fn save_state(&self) -> TreePersistState {
        TreePersistState {
            collapsed_ids: self
                .visibility()
                .closed_ids(self.tree())
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Replace the collapsed set with a snapshot.
    ///
    /// Ids missing from the current dataset are skipped. Returns how many
    /// nodes ended up collapsed.
    pub fn restore_state(&mut self, state: &TreePersistState) -> usize {
        self.expand_all();
        let known: Vec<&str> = state
            .collapsed_ids
            .iter()
            .map(String::as_str)
            .filter(|id| self.tree().index_of(id).is_some())
            .collect();
        let skipped = state.collapsed_ids.len() - known.len();
        if skipped > 0 {
            tracing::debug!(message = "vtree.restore.skipped", skipped);
        }
        self.collapse(known);
        self.visibility().closed_len()
    }
}
