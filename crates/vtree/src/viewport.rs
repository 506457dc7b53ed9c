#![forbid(unsafe_code)]

//! Viewport-relative scroll targeting.
//!
//! The rendering host owns the actual windowing and reports which rows of the
//! displayed subsequence are on screen. [`Viewport`] keeps that inclusive
//! range and decides whether revealing a row needs a scroll at all.

use ahash::AHashMap;

use crate::flatten::{FlatTree, TreeData};
use crate::search::SearchMatch;

/// Where a revealed row should land inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScrollAlign {
    /// Row at the top edge.
    Start,
    /// Row centered (default).
    #[default]
    Center,
    /// Row at the bottom edge.
    End,
}

/// Animation policy for a scroll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScrollBehavior {
    /// Jump immediately.
    Instant,
    /// Animate if the host supports it (default).
    #[default]
    Smooth,
}

/// A request for the host to scroll a row of the displayed list into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    /// Row in the displayed (visible) list.
    pub index: usize,
    /// Target placement.
    pub align: ScrollAlign,
    /// Animation policy.
    pub behavior: ScrollBehavior,
}

/// Inclusive on-screen row range as last reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    first: usize,
    last: usize,
    align: ScrollAlign,
    behavior: ScrollBehavior,
}

impl Viewport {
    /// Empty range at the top with default scroll policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placement used for scroll requests.
    #[must_use]
    pub fn with_align(mut self, align: ScrollAlign) -> Self {
        self.align = align;
        self
    }

    /// Set the animation policy used for scroll requests.
    #[must_use]
    pub fn with_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// First on-screen row.
    #[must_use]
    pub fn first(&self) -> usize {
        self.first
    }

    /// Last on-screen row (inclusive).
    #[must_use]
    pub fn last(&self) -> usize {
        self.last
    }

    /// Record a range-changed notification from the host.
    pub fn set_range(&mut self, first: usize, last: usize) {
        let (first, last) = if first <= last {
            (first, last)
        } else {
            tracing::trace!(message = "vtree.viewport.swapped_range", first, last);
            (last, first)
        };
        self.first = first;
        self.last = last;
    }

    /// Whether a displayed row is currently on screen.
    #[must_use]
    pub fn is_within_range(&self, index: usize) -> bool {
        index >= self.first && index <= self.last
    }

    /// Decide whether revealing `index` needs a scroll.
    ///
    /// `node` is the record the caller resolved for the row; `None` (a stale
    /// lookup) never scrolls.
    #[must_use]
    pub fn reveal_index(&self, index: usize, node: Option<&TreeData>) -> Option<ScrollRequest> {
        if node.is_none() || self.is_within_range(index) {
            return None;
        }
        Some(ScrollRequest {
            index,
            align: self.align,
            behavior: self.behavior,
        })
    }

    /// Pick the match to mark active after the match set changes.
    ///
    /// Scans the on-screen rows top to bottom and returns the position in
    /// `matches` of the first row that is a match. When no match is on screen
    /// the first match (`Some(0)`) is chosen, and `None` means there are no
    /// matches at all.
    #[must_use]
    pub fn first_visible_match_index(
        &self,
        matches: &[SearchMatch],
        tree: &FlatTree,
        visible: &[usize],
    ) -> Option<usize> {
        if matches.is_empty() {
            return None;
        }
        let mut by_id: AHashMap<&str, usize> = AHashMap::with_capacity(matches.len());
        for (i, m) in matches.iter().enumerate() {
            by_id.entry(m.node_id.as_str()).or_insert(i);
        }

        let end = self.last.saturating_add(1).min(visible.len());
        let start = self.first.min(end);
        visible[start..end]
            .iter()
            .filter_map(|&record| tree.record(record))
            .find_map(|record| by_id.get(record.id()).copied())
            .or(Some(0))
    }
}
