#![forbid(unsafe_code)]

//! Pre-order flattening of a forest into an indexable arena.
//!
//! [`flatten`] walks the forest once and produces one [`TreeData`] per node in
//! pre-order (node, then each child left to right). Parent and child links are
//! arena indices, never references, so a [`FlatTree`] has no cycles and can be
//! rebuilt wholesale whenever the host hands over a new dataset.
//!
//! Because the order is pre-order, the descendants of record `i` always occupy
//! the contiguous index range `i + 1..subtree_end`. The visibility layer relies
//! on this.
//!
//! # Example
//!
//! ```
//! use vtree::flatten::flatten;
//! use vtree::node::SourceNode;
//!
//! let forest = vec![SourceNode::new("root", "root")
//!     .child(SourceNode::new("leaf1", "leaf1"))
//!     .child(SourceNode::new("leaf2", "leaf2"))];
//! let flat = flatten(&forest);
//!
//! let levels: Vec<_> = flat.iter().map(|r| (r.id(), r.level())).collect();
//! assert_eq!(levels, [("root", 0), ("leaf1", 1), ("leaf2", 1)]);
//! assert_eq!(flat.descendants(0).collect::<Vec<_>>(), ["leaf1", "leaf2"]);
//! ```

use std::ops::Range;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::node::SourceNode;

/// Derived per-node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeData {
    index: usize,
    id: String,
    name: String,
    level: usize,
    is_leaf: bool,
    parent: Option<usize>,
    children: Vec<usize>,
    subtree_end: usize,
    position: usize,
}

impl TreeData {
    /// Position in pre-order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Normalized string id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name copied from the source node.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Depth; roots are level 0.
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// True iff the source node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Arena index of the parent, `None` for roots.
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Arena indices of the direct children, left to right.
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Index range covering every descendant of this record.
    #[must_use]
    pub fn descendant_range(&self) -> Range<usize> {
        self.index + 1..self.subtree_end
    }
}

/// Flattened forest: the full pre-order record list plus an id index.
#[derive(Debug, Clone, Default)]
pub struct FlatTree {
    forest: Vec<SourceNode>,
    records: Vec<TreeData>,
    by_id: AHashMap<String, usize>,
}

struct Frame<'a> {
    node: &'a SourceNode,
    parent: Option<usize>,
    level: usize,
    position: usize,
}

/// Flatten a forest into pre-order records.
///
/// The forest is copied; later changes on the host side require another call.
#[must_use]
pub fn flatten(forest: &[SourceNode]) -> FlatTree {
    FlatTree::new(forest.to_vec())
}

impl FlatTree {
    /// Build from an owned forest.
    #[must_use]
    pub fn new(forest: Vec<SourceNode>) -> Self {
        let span = tracing::debug_span!(
            "vtree.flatten",
            root_count = forest.len(),
            node_count = tracing::field::Empty,
            max_level = tracing::field::Empty
        );
        let _guard = span.enter();

        let mut records: Vec<TreeData> = Vec::new();
        let mut by_id: AHashMap<String, usize> = AHashMap::new();
        let mut max_level = 0usize;

        let mut stack: Vec<Frame<'_>> = forest
            .iter()
            .enumerate()
            .rev()
            .map(|(i, node)| Frame {
                node,
                parent: None,
                level: 0,
                position: i,
            })
            .collect();

        while let Some(frame) = stack.pop() {
            let index = records.len();
            let id = frame.node.id().to_string();
            if by_id.contains_key(&id) {
                tracing::warn!(message = "vtree.flatten.duplicate_id", id = %id, index);
            } else {
                by_id.insert(id.clone(), index);
            }
            if let Some(parent) = frame.parent {
                records[parent].children.push(index);
            }
            max_level = max_level.max(frame.level);

            for (i, child) in frame.node.children().iter().enumerate().rev() {
                stack.push(Frame {
                    node: child,
                    parent: Some(index),
                    level: frame.level + 1,
                    position: i,
                });
            }

            records.push(TreeData {
                index,
                id,
                name: frame.node.name().to_owned(),
                level: frame.level,
                is_leaf: frame.node.is_leaf(),
                parent: frame.parent,
                children: Vec::with_capacity(frame.node.children().len()),
                subtree_end: index + 1,
                position: frame.position,
            });
        }

        // Children always carry larger indices than their parent, so a reverse
        // sweep sees every child's final extent before the parent's.
        for index in (0..records.len()).rev() {
            if let Some(&last_child) = records[index].children.last() {
                records[index].subtree_end = records[last_child].subtree_end;
            }
        }

        span.record("node_count", records.len());
        span.record("max_level", max_level);

        Self {
            forest,
            records,
            by_id,
        }
    }

    /// The ingested forest.
    #[must_use]
    pub fn forest(&self) -> &[SourceNode] {
        &self.forest
    }

    /// All records in pre-order.
    #[must_use]
    pub fn records(&self) -> &[TreeData] {
        &self.records
    }

    /// Iterate records in pre-order.
    pub fn iter(&self) -> std::slice::Iter<'_, TreeData> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the forest was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at a pre-order index.
    #[must_use]
    pub fn record(&self, index: usize) -> Option<&TreeData> {
        self.records.get(index)
    }

    /// Look up a record by id. Unknown ids yield `None`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TreeData> {
        self.index_of(id).map(|index| &self.records[index])
    }

    /// Pre-order index for an id.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Indices of root records.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.records
            .iter()
            .filter(|r| r.parent.is_none())
            .map(|r| r.index)
    }

    /// Resolve the source node a record was derived from.
    #[must_use]
    pub fn source(&self, index: usize) -> Option<&SourceNode> {
        let record = self.records.get(index)?;
        let mut path: SmallVec<[usize; 8]> = SmallVec::new();
        path.push(record.position);
        path.extend(self.ancestors(index).map(|i| self.records[i].position));

        let mut positions = path.into_iter().rev();
        let mut current = self.forest.get(positions.next()?)?;
        for i in positions {
            current = current.children().get(i)?;
        }
        Some(current)
    }

    /// Descendant ids of a record in pre-order.
    ///
    /// Out-of-range indices yield an empty iterator.
    pub fn descendants(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        let range = self
            .records
            .get(index)
            .map_or(0..0, TreeData::descendant_range);
        self.records[range].iter().map(TreeData::id)
    }

    /// Ancestor indices of a record, nearest first.
    pub fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(
            self.records.get(index).and_then(|r| r.parent),
            move |&i| self.records[i].parent,
        )
    }
}
