#![forbid(unsafe_code)]

//! Collapse state and the visible subsequence.
//!
//! The closed-set is the single source of truth for what is hidden: a record
//! index is present iff that node is collapsed, and the value is the index
//! range of its descendants. Instead of re-flattening the union of all hidden
//! ranges on every query, each record carries a hide count (how many collapsed
//! ancestors cover it). A record is visible iff its count is zero, which yields
//! the same sequence as filtering against the union.
//!
//! Every operation takes the [`FlatTree`] the state was created for. Using a
//! state against a different tree is a caller bug; out-of-range indices are
//! ignored.

use std::collections::HashMap;
use std::ops::Range;

use ahash::RandomState;

use crate::flatten::FlatTree;

/// Collapse state for one flattened dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    closed: HashMap<usize, Range<usize>, RandomState>,
    hide_counts: Vec<u32>,
    visible: Vec<usize>,
}

impl Visibility {
    /// Everything expanded.
    #[must_use]
    pub fn new(tree: &FlatTree) -> Self {
        Self {
            closed: HashMap::default(),
            hide_counts: vec![0; tree.len()],
            visible: (0..tree.len()).collect(),
        }
    }

    /// Visible record indices in pre-order.
    #[must_use]
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    /// Position of a record inside [`Self::visible`], if shown.
    #[must_use]
    pub fn visible_position(&self, index: usize) -> Option<usize> {
        if self.is_hidden(index) || index >= self.hide_counts.len() {
            return None;
        }
        self.visible.binary_search(&index).ok()
    }

    /// Whether some collapsed ancestor hides this record.
    #[must_use]
    pub fn is_hidden(&self, index: usize) -> bool {
        self.hide_counts.get(index).is_some_and(|&c| c > 0)
    }

    /// Whether the record is collapsed.
    #[must_use]
    pub fn is_collapsed(&self, index: usize) -> bool {
        self.closed.contains_key(&index)
    }

    /// Inverse of [`Self::is_collapsed`]; the derived `isOpen` flag.
    #[must_use]
    pub fn is_open(&self, index: usize) -> bool {
        !self.is_collapsed(index)
    }

    /// Number of collapsed records.
    #[must_use]
    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }

    /// Collapsed record indices in pre-order.
    #[must_use]
    pub fn closed_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.closed.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Collapsed ids in document order.
    #[must_use]
    pub fn closed_ids<'t>(&self, tree: &'t FlatTree) -> Vec<&'t str> {
        self.closed_indices()
            .into_iter()
            .filter_map(|i| tree.record(i).map(|r| r.id()))
            .collect()
    }

    /// Hidden descendant range stored for a collapsed record.
    #[must_use]
    pub fn closed_range(&self, index: usize) -> Option<Range<usize>> {
        self.closed.get(&index).cloned()
    }

    /// Collapse each record. Already-collapsed records are left untouched.
    ///
    /// Returns `true` if any record changed state.
    pub fn collapse(&mut self, tree: &FlatTree, indices: impl IntoIterator<Item = usize>) -> bool {
        let mut changed = 0usize;
        for index in indices {
            let Some(record) = tree.record(index) else {
                continue;
            };
            if self.closed.contains_key(&index) {
                continue;
            }
            let range = record.descendant_range();
            for count in &mut self.hide_counts[range.clone()] {
                *count = count.saturating_add(1);
            }
            self.closed.insert(index, range);
            changed += 1;
        }
        self.finish("collapse", changed)
    }

    /// Expand each record. Records that are not collapsed are left untouched.
    ///
    /// Returns `true` if any record changed state.
    pub fn expand(&mut self, tree: &FlatTree, indices: impl IntoIterator<Item = usize>) -> bool {
        let mut changed = 0usize;
        for index in indices {
            if index >= tree.len() {
                continue;
            }
            let Some(range) = self.closed.remove(&index) else {
                continue;
            };
            for count in &mut self.hide_counts[range] {
                *count = count.saturating_sub(1);
            }
            changed += 1;
        }
        self.finish("expand", changed)
    }

    /// Expand every collapsed record.
    pub fn expand_all(&mut self, tree: &FlatTree) -> bool {
        let all = self.closed_indices();
        self.expand(tree, all)
    }

    /// Collapse every internal (non-leaf) record.
    pub fn collapse_all(&mut self, tree: &FlatTree) -> bool {
        let internal: Vec<usize> = tree
            .iter()
            .filter(|r| !r.is_leaf())
            .map(|r| r.index())
            .collect();
        self.collapse(tree, internal)
    }

    /// Expand if collapsed, else collapse.
    pub fn toggle(&mut self, tree: &FlatTree, index: usize) -> bool {
        if self.is_collapsed(index) {
            self.expand(tree, [index])
        } else {
            self.collapse(tree, [index])
        }
    }

    fn finish(&mut self, action: &str, changed: usize) -> bool {
        if changed == 0 {
            return false;
        }
        self.recompute();
        tracing::debug!(
            message = "vtree.toggle",
            action,
            count = changed,
            visible_len = self.visible.len(),
            closed_len = self.closed.len()
        );
        true
    }

    fn recompute(&mut self) {
        self.visible.clear();
        self.visible.extend(
            self.hide_counts
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == 0)
                .map(|(i, _)| i),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::node::SourceNode;

    fn forest() -> FlatTree {
        // 0 root
        // 1   a
        // 2     a1
        // 3     a2
        // 4       a2x
        // 5   b
        flatten(&[SourceNode::new("root", "root")
            .child(
                SourceNode::new("a", "a")
                    .child(SourceNode::new("a1", "a1"))
                    .child(SourceNode::new("a2", "a2").child(SourceNode::new("a2x", "a2x"))),
            )
            .child(SourceNode::new("b", "b"))])
    }

    #[test]
    fn starts_fully_visible() {
        let tree = forest();
        let vis = Visibility::new(&tree);
        assert_eq!(vis.visible(), [0, 1, 2, 3, 4, 5]);
        assert_eq!(vis.closed_len(), 0);
        assert!(vis.is_open(0));
    }

    #[test]
    fn collapse_root_keeps_root_only() {
        let tree = forest();
        let mut vis = Visibility::new(&tree);
        assert!(vis.collapse(&tree, [0]));
        assert_eq!(vis.visible(), [0]);
        assert!(!vis.is_open(0));
        assert_eq!(vis.closed_range(0), Some(1..6));
    }

    #[test]
    fn collapse_is_idempotent() {
        let tree = forest();
        let mut vis = Visibility::new(&tree);
        vis.collapse(&tree, [1]);
        let snapshot = vis.clone();
        assert!(!vis.collapse(&tree, [1]));
        assert_eq!(vis, snapshot);
    }

    #[test]
    fn expand_not_collapsed_is_noop() {
        let tree = forest();
        let mut vis = Visibility::new(&tree);
        assert!(!vis.expand(&tree, [1]));
        assert_eq!(vis.visible(), [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn nested_collapse_stays_hidden_until_both_expand() {
        let tree = forest();
        let mut vis = Visibility::new(&tree);
        vis.collapse(&tree, [3]);
        vis.collapse(&tree, [1]);
        assert_eq!(vis.visible(), [0, 1, 5]);

        vis.expand(&tree, [1]);
        // a2 is still collapsed, so a2x stays hidden.
        assert_eq!(vis.visible(), [0, 1, 2, 3, 5]);

        vis.expand(&tree, [3]);
        assert_eq!(vis.visible(), [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let tree = forest();
        let mut vis = Visibility::new(&tree);
        vis.collapse(&tree, [3]);
        let before = vis.clone();
        for index in 0..tree.len() {
            vis.toggle(&tree, index);
            vis.toggle(&tree, index);
            assert_eq!(vis, before, "double toggle of {index} changed state");
        }
    }

    #[test]
    fn collapse_all_then_expand_all() {
        let tree = forest();
        let mut vis = Visibility::new(&tree);
        vis.collapse_all(&tree);
        assert_eq!(vis.closed_indices(), [0, 1, 3]);
        assert_eq!(vis.closed_ids(&tree), ["root", "a", "a2"]);
        assert_eq!(vis.visible(), [0]);

        vis.expand_all(&tree);
        assert_eq!(vis.closed_len(), 0);
        assert_eq!(vis.visible(), [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn collapsing_leaf_hides_nothing() {
        let tree = forest();
        let mut vis = Visibility::new(&tree);
        assert!(vis.collapse(&tree, [2]));
        assert!(vis.is_collapsed(2));
        assert_eq!(vis.visible().len(), 6);
    }

    #[test]
    fn out_of_range_indices_ignored() {
        let tree = forest();
        let mut vis = Visibility::new(&tree);
        assert!(!vis.collapse(&tree, [42]));
        assert!(!vis.expand(&tree, [42]));
        assert!(!vis.toggle(&tree, 42));
        assert_eq!(vis.visible().len(), 6);
    }

    #[test]
    fn visible_position_tracks_hidden_rows() {
        let tree = forest();
        let mut vis = Visibility::new(&tree);
        vis.collapse(&tree, [1]);
        assert_eq!(vis.visible_position(5), Some(2));
        assert_eq!(vis.visible_position(2), None);
        assert_eq!(vis.visible_position(99), None);
    }
}
