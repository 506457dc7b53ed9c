#![forbid(unsafe_code)]

//! Search-match navigation state.
//!
//! ```text
//!            pattern set              go_to / next / previous
//!   Idle ───────────────▶ PatternChanged ─────────────────▶ Navigating ─┐
//!    ▲                         │                                 ▲      │
//!    │      pattern cleared    │                                 └──────┘
//!    └─────────────────────────┴──────────────────────────────────────────
//! ```
//!
//! The state only tracks which match is active; expanding, searching, and
//! scrolling are driven by [`crate::engine::VirtualTree`].

use ahash::AHashSet;

use crate::search::SearchMatch;

/// Navigation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    /// No pattern.
    #[default]
    Idle,
    /// A pattern was applied; the active match was chosen automatically.
    PatternChanged,
    /// The user moved between matches explicitly.
    Navigating,
}

/// Summary reported to the host whenever the match set or active match changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchSummary {
    /// Position of the active match, if any.
    pub active: Option<usize>,
    /// Number of matches.
    pub total: usize,
}

impl SearchSummary {
    /// `(active, total)` with `-1` standing in for "no active match".
    #[must_use]
    pub fn as_signed(self) -> (isize, usize) {
        let active = self
            .active
            .and_then(|i| isize::try_from(i).ok())
            .unwrap_or(-1);
        (active, self.total)
    }
}

/// Pattern, matches, and active match for one dataset.
#[derive(Debug, Clone, Default)]
pub struct SearchNav {
    pattern: String,
    matches: Vec<SearchMatch>,
    match_ids: AHashSet<String>,
    active: Option<usize>,
    state: NavState,
}

impl SearchNav {
    /// Idle with no pattern.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> NavState {
        self.state
    }

    /// Pattern currently applied (empty when idle).
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Matches in document order.
    #[must_use]
    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// Position of the active match.
    #[must_use]
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// The active match itself.
    #[must_use]
    pub fn active_match(&self) -> Option<&SearchMatch> {
        self.active.and_then(|i| self.matches.get(i))
    }

    /// Whether a node id is in the current match set.
    #[must_use]
    pub fn is_match(&self, id: &str) -> bool {
        self.match_ids.contains(id)
    }

    /// Current summary.
    #[must_use]
    pub fn summary(&self) -> SearchSummary {
        SearchSummary {
            active: self.active,
            total: self.matches.len(),
        }
    }

    /// Replace the match set after a pattern change.
    ///
    /// An empty pattern returns to [`NavState::Idle`]. `active` outside the
    /// match list is dropped.
    pub fn pattern_changed(
        &mut self,
        pattern: &str,
        matches: Vec<SearchMatch>,
        active: Option<usize>,
    ) {
        if pattern.is_empty() {
            self.clear();
            return;
        }
        self.pattern = pattern.to_owned();
        self.match_ids = matches.iter().map(|m| m.node_id.clone()).collect();
        self.active = active.filter(|&i| i < matches.len());
        self.matches = matches;
        self.state = NavState::PatternChanged;
    }

    /// Make match `index` active.
    ///
    /// Ignored while idle or when `index` is out of range.
    pub fn go_to(&mut self, index: usize) -> Option<&SearchMatch> {
        if self.state == NavState::Idle || index >= self.matches.len() {
            return None;
        }
        self.active = Some(index);
        self.state = NavState::Navigating;
        self.matches.get(index)
    }

    /// Advance to the next match, wrapping at the end.
    pub fn next(&mut self) -> Option<&SearchMatch> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        let target = self.active.map_or(0, |i| (i + 1) % len);
        self.go_to(target)
    }

    /// Step back to the previous match, wrapping at the start.
    pub fn previous(&mut self) -> Option<&SearchMatch> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        let target = self.active.map_or(len - 1, |i| (i + len - 1) % len);
        self.go_to(target)
    }

    /// Drop the pattern and the active marker.
    pub fn clear(&mut self) {
        self.pattern.clear();
        self.matches.clear();
        self.match_ids.clear();
        self.active = None;
        self.state = NavState::Idle;
    }
}
