#![forbid(unsafe_code)]

//! The virtual tree session.
//!
//! [`VirtualTree`] owns one flattened dataset together with its collapse
//! state, search state, selection, and the last reported viewport range. The
//! host drives it with input (toggles, pattern changes, range notifications)
//! and receives notifications through [`TreeHost`].
//!
//! # Example
//!
//! ```
//! use vtree::engine::VirtualTree;
//! use vtree::node::SourceNode;
//!
//! let mut tree = VirtualTree::new(vec![SourceNode::new("root", "root")
//!     .child(SourceNode::new("leaf1", "leaf1"))
//!     .child(SourceNode::new("leaf2", "leaf2"))]);
//!
//! tree.set_pattern("leaf1");
//! assert_eq!(tree.summary().as_signed(), (0, 1));
//!
//! tree.toggle("root");
//! let rows: Vec<_> = tree.visible_rows().map(|r| r.record.id()).collect();
//! assert_eq!(rows, ["root"]);
//! ```

use std::ops::Range;

use crate::config::TreeConfig;
use crate::flatten::{FlatTree, TreeData};
use crate::navigation::{NavState, SearchNav, SearchSummary};
use crate::node::SourceNode;
use crate::search::{SearchOptions, search};
use crate::viewport::{ScrollRequest, Viewport};
use crate::visibility::Visibility;

/// Notifications from the engine to the rendering host.
///
/// Every method has an empty default body; `()` ignores everything.
pub trait TreeHost {
    /// A node was selected.
    fn on_select(&mut self, _node: &SourceNode) {}

    /// A node was expanded or collapsed by [`VirtualTree::toggle`].
    fn on_toggle(&mut self, _node: &SourceNode) {}

    /// The match set or the active match changed.
    fn on_search_summary(&mut self, _summary: SearchSummary) {}

    /// A row must be scrolled into view.
    fn on_scroll_request(&mut self, _request: ScrollRequest) {}
}

impl TreeHost for () {}

/// One displayed row with its render flags.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    /// Position in the displayed list.
    pub row: usize,
    /// Flattened record behind the row.
    pub record: &'a TreeData,
    /// Not collapsed.
    pub is_open: bool,
    /// The user-selected node.
    pub is_selected: bool,
    /// In the current match set.
    pub is_search_match: bool,
    /// The node scroll-reveal keeps on screen.
    pub is_active_selection: bool,
}

/// Session state for one dataset.
#[derive(Debug)]
pub struct VirtualTree<H: TreeHost = ()> {
    tree: FlatTree,
    visibility: Visibility,
    viewport: Viewport,
    nav: SearchNav,
    options: SearchOptions,
    selected: Option<usize>,
    active_selection: Option<usize>,
    host: H,
}

impl VirtualTree<()> {
    /// Session without a host.
    #[must_use]
    pub fn new(forest: Vec<SourceNode>) -> Self {
        Self::with_host(forest, ())
    }
}

impl<H: TreeHost> VirtualTree<H> {
    /// Session reporting to `host`, with default search and scroll policy.
    pub fn with_host(forest: Vec<SourceNode>, host: H) -> Self {
        let tree = FlatTree::new(forest);
        let visibility = Visibility::new(&tree);
        Self {
            tree,
            visibility,
            viewport: Viewport::new(),
            nav: SearchNav::new(),
            options: SearchOptions::default(),
            selected: None,
            active_selection: None,
            host,
        }
    }

    /// Session using the search and scroll policy from `config`.
    pub fn with_config(forest: Vec<SourceNode>, config: &TreeConfig, host: H) -> Self {
        let mut session = Self::with_host(forest, host);
        session.options = config.search_options();
        session.viewport = config.viewport();
        session
    }

    // --- Accessors ---

    /// The flattened dataset.
    #[must_use]
    pub fn tree(&self) -> &FlatTree {
        &self.tree
    }

    /// Collapse state.
    #[must_use]
    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    /// Last reported viewport.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Pattern compilation options.
    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        self.options
    }

    /// Search navigation state.
    #[must_use]
    pub fn nav(&self) -> &SearchNav {
        &self.nav
    }

    /// Current navigation state.
    #[must_use]
    pub fn nav_state(&self) -> NavState {
        self.nav.state()
    }

    /// Active match position and match count.
    #[must_use]
    pub fn summary(&self) -> SearchSummary {
        self.nav.summary()
    }

    /// The selected record.
    #[must_use]
    pub fn selected(&self) -> Option<&TreeData> {
        self.selected.and_then(|i| self.tree.record(i))
    }

    /// The active selection record.
    #[must_use]
    pub fn active_selection(&self) -> Option<&TreeData> {
        self.active_selection.and_then(|i| self.tree.record(i))
    }

    /// The host receiving notifications.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consume the session, returning the host.
    pub fn into_host(self) -> H {
        self.host
    }

    // --- Dataset ---

    /// Replace the dataset.
    ///
    /// Collapse state, selection, and matches are discarded; a non-empty
    /// pattern is re-run against the new forest.
    pub fn set_forest(&mut self, forest: Vec<SourceNode>) {
        self.tree = FlatTree::new(forest);
        self.visibility = Visibility::new(&self.tree);
        self.selected = None;
        self.active_selection = None;
        let pattern = self.nav.pattern().to_owned();
        self.nav.clear();
        if !pattern.is_empty() {
            self.apply_pattern(&pattern);
        }
    }

    /// Descendant ids of a node in pre-order.
    #[must_use]
    pub fn descendant_ids(&self, id: &str) -> Vec<&str> {
        match self.lookup(id) {
            Some(index) => self.tree.descendants(index).collect(),
            None => Vec::new(),
        }
    }

    fn lookup(&self, id: &str) -> Option<usize> {
        let index = self.tree.index_of(id);
        if index.is_none() {
            tracing::trace!(message = "vtree.unknown_id", id);
        }
        index
    }

    fn lookup_all<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
        ids.into_iter().filter_map(|id| self.lookup(id)).collect()
    }

    // --- Collapse state ---

    /// Flip a node between expanded and collapsed, notifying the host.
    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(index) = self.lookup(id) else {
            return false;
        };
        let changed = self.visibility.toggle(&self.tree, index);
        if changed {
            if let Some(node) = self.tree.source(index) {
                self.host.on_toggle(node);
            }
        }
        changed
    }

    /// Expand the given nodes. Returns `true` if anything changed.
    pub fn expand<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        let indices = self.lookup_all(ids);
        self.visibility.expand(&self.tree, indices)
    }

    /// Collapse the given nodes. Returns `true` if anything changed.
    pub fn collapse<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        let indices = self.lookup_all(ids);
        self.visibility.collapse(&self.tree, indices)
    }

    /// Expand every node. Returns `true` if anything changed.
    pub fn expand_all(&mut self) -> bool {
        self.visibility.expand_all(&self.tree)
    }

    /// Collapse every internal node. Returns `true` if anything changed.
    pub fn collapse_all(&mut self) -> bool {
        self.visibility.collapse_all(&self.tree)
    }

    // --- Search ---

    /// Apply a new search pattern.
    ///
    /// A non-empty pattern expands every node, searches the full forest, and
    /// marks the first on-screen match active (or the first match). An empty
    /// pattern clears the search. Re-applying the current pattern is a no-op.
    pub fn set_pattern(&mut self, pattern: &str) {
        if pattern == self.nav.pattern() {
            return;
        }
        if pattern.is_empty() {
            self.clear_pattern();
            return;
        }
        self.apply_pattern(pattern);
    }

    /// Change compilation options, re-running an active pattern.
    pub fn set_search_options(&mut self, options: SearchOptions) {
        if options == self.options {
            return;
        }
        self.options = options;
        let pattern = self.nav.pattern().to_owned();
        if !pattern.is_empty() {
            self.apply_pattern(&pattern);
        }
    }

    fn apply_pattern(&mut self, pattern: &str) {
        self.visibility.expand_all(&self.tree);
        let matches = search(self.tree.forest(), pattern, &self.options);
        let active =
            self.viewport
                .first_visible_match_index(&matches, &self.tree, self.visibility.visible());
        self.nav.pattern_changed(pattern, matches, active);
        self.active_selection = self
            .nav
            .active_match()
            .and_then(|m| self.tree.index_of(&m.node_id));
        self.report_summary();
        if let Some(index) = self.active_selection {
            self.reveal(index);
        }
    }

    /// Make match `index` active and scroll it into view.
    pub fn go_to_match(&mut self, index: usize) -> bool {
        let Some(id) = self.nav.go_to(index).map(|m| m.node_id.clone()) else {
            tracing::trace!(message = "vtree.search.no_match", index);
            return false;
        };
        self.activate_match(&id);
        true
    }

    /// Move to the next match, wrapping to the first.
    pub fn next_match(&mut self) -> bool {
        let Some(id) = self.nav.next().map(|m| m.node_id.clone()) else {
            return false;
        };
        self.activate_match(&id);
        true
    }

    /// Move to the previous match, wrapping to the last.
    pub fn previous_match(&mut self) -> bool {
        let Some(id) = self.nav.previous().map(|m| m.node_id.clone()) else {
            return false;
        };
        self.activate_match(&id);
        true
    }

    fn activate_match(&mut self, id: &str) {
        self.active_selection = self.tree.index_of(id);
        self.report_summary();
        if let Some(index) = self.active_selection {
            self.reveal(index);
        }
    }

    /// Drop the pattern, the match set, and the active marker.
    pub fn clear_pattern(&mut self) {
        if self.nav.state() == NavState::Idle {
            return;
        }
        self.nav.clear();
        self.active_selection = None;
        self.report_summary();
    }

    fn report_summary(&mut self) {
        let summary = self.nav.summary();
        tracing::debug!(
            message = "vtree.search.summary",
            active = ?summary.active,
            total = summary.total
        );
        self.host.on_search_summary(summary);
    }

    // --- Viewport and selection ---

    /// Record the host's on-screen row range (inclusive).
    pub fn set_visible_range(&mut self, first: usize, last: usize) {
        self.viewport.set_range(first, last);
    }

    /// Select a node and notify the host.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(index) = self.lookup(id) else {
            return false;
        };
        self.selected = Some(index);
        if let Some(node) = self.tree.source(index) {
            self.host.on_select(node);
        }
        true
    }

    /// Make a node the active selection and scroll it into view.
    ///
    /// Collapsed ancestors are expanded first.
    pub fn set_active_selection(&mut self, id: &str) -> bool {
        let Some(index) = self.lookup(id) else {
            return false;
        };
        self.active_selection = Some(index);
        self.reveal(index);
        true
    }

    fn reveal(&mut self, index: usize) {
        if self.visibility.is_hidden(index) {
            let collapsed: Vec<usize> = self
                .tree
                .ancestors(index)
                .filter(|&a| self.visibility.is_collapsed(a))
                .collect();
            self.visibility.expand(&self.tree, collapsed);
        }
        let Some(position) = self.visibility.visible_position(index) else {
            return;
        };
        if let Some(request) = self.viewport.reveal_index(position, self.tree.record(index)) {
            tracing::debug!(
                message = "vtree.scroll",
                index = request.index,
                align = ?request.align
            );
            self.host.on_scroll_request(request);
        }
    }

    // --- Rows ---

    /// Number of displayed rows.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visibility.visible().len()
    }

    /// One displayed row.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<RowView<'_>> {
        let &index = self.visibility.visible().get(row)?;
        let record = self.tree.record(index)?;
        Some(RowView {
            row,
            record,
            is_open: self.visibility.is_open(index),
            is_selected: self.selected == Some(index),
            is_search_match: self.nav.is_match(record.id()),
            is_active_selection: self.active_selection == Some(index),
        })
    }

    /// All displayed rows in order.
    pub fn visible_rows(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        self.rows(0..self.visible_len())
    }

    /// Displayed rows in `range`, clamped to the list.
    pub fn rows(&self, range: Range<usize>) -> impl Iterator<Item = RowView<'_>> + '_ {
        let end = range.end.min(self.visible_len());
        let start = range.start.min(end);
        (start..end).filter_map(move |r| self.row(r))
    }
}
