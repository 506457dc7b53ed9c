#![forbid(unsafe_code)]

//! Source node model.
//!
//! A forest is a slice of root [`SourceNode`]s owned by the host. The engine
//! copies it on ingestion and never mutates it afterwards.
//!
//! # Example
//!
//! ```
//! use vtree::node::SourceNode;
//!
//! let root = SourceNode::new("root", "root")
//!     .child(SourceNode::new("src", "src")
//!         .child(SourceNode::new("src/main.rs", "main.rs"))
//!         .child(SourceNode::new("src/lib.rs", "lib.rs")))
//!     .child(SourceNode::new(7, "Cargo.toml"));
//!
//! assert_eq!(root.name(), "root");
//! assert_eq!(root.children().len(), 2);
//! assert_eq!(root.children()[1].id().to_string(), "7");
//! ```

use std::fmt;

/// Identity assigned by the upstream data source.
///
/// Numbers and strings are both accepted; [`fmt::Display`] yields the
/// normalized string key the engine indexes by, so `Number(7)` and
/// `Text("7")` address the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SourceId {
    /// Integer identity.
    Number(i64),
    /// String identity (object keys, paths).
    Text(String),
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SourceId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for SourceId {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<u32> for SourceId {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SourceId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A node in the host-owned hierarchy.
///
/// Cloning, comparing, and dropping walk the subtree with an explicit stack,
/// so arbitrarily deep chains are handled without growing the call stack.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceNode {
    id: SourceId,
    name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    children: Vec<SourceNode>,
}

impl SourceNode {
    /// Create a leaf node.
    #[must_use]
    pub fn new(id: impl Into<SourceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Add a child node.
    #[must_use]
    pub fn child(mut self, node: SourceNode) -> Self {
        self.children.push(node);
        self
    }

    /// Set children from a vec.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<SourceNode>) -> Self {
        self.children = nodes;
        self
    }

    /// Get the upstream identity.
    #[must_use]
    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// Get the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the children.
    #[must_use]
    pub fn children(&self) -> &[SourceNode] {
        &self.children
    }

    /// Whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Count this node and all of its descendants.
    #[must_use]
    pub fn total_count(&self) -> usize {
        let mut count = 0usize;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count = count.saturating_add(1);
            stack.extend(node.children.iter());
        }
        count
    }
}

impl Clone for SourceNode {
    fn clone(&self) -> Self {
        let mut order: Vec<&SourceNode> = Vec::new();
        let mut stack: Vec<&SourceNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(node.children.iter().rev());
        }

        // Reverse pre-order finishes every subtree before its parent; the
        // finished children of a node sit on top of `built`, last child first.
        let mut built: Vec<SourceNode> = Vec::with_capacity(order.len());
        for node in order.into_iter().rev() {
            let mut children = built.split_off(built.len() - node.children.len());
            children.reverse();
            built.push(Self {
                id: node.id.clone(),
                name: node.name.clone(),
                children,
            });
        }
        built.reverse();

        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            children: built,
        }
    }
}

impl PartialEq for SourceNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.id != b.id || a.name != b.name || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

impl Eq for SourceNode {}

impl Drop for SourceNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Count every node in a forest.
#[must_use]
pub fn forest_len(forest: &[SourceNode]) -> usize {
    forest
        .iter()
        .fold(0usize, |acc, root| acc.saturating_add(root.total_count()))
}
