#![forbid(unsafe_code)]

//! Ordered multi-segment path search over a forest.
//!
//! A pattern such as `var/log/\.gz$` is split on a delimiter into segments,
//! each compiled into a regular expression. Matching walks the canonical forest
//! depth-first (collapsed nodes are still searched) while threading a single
//! segment index down each root-to-node path:
//!
//! - a node whose name matches the current segment advances the index for its
//!   descendants, or, on the last segment, is recorded as a match and resets
//!   the index to 0;
//! - a node that does not match resets the index to 0 for its descendants.
//!
//! There is no backtracking: only the greedy left-to-right alignment along each
//! path is found. For the tree `a/a/b`, the pattern `a/b` does not match `b`,
//! because the second `a` fails segment `b` and restarts at segment `a`.
//!
//! Invalid patterns never error. If any segment fails to compile the whole,
//! unsplit pattern is tried as a single regex; if that fails too the search
//! yields no matches.
//!
//! # Example
//!
//! ```
//! use vtree::node::SourceNode;
//! use vtree::search::{SearchOptions, search};
//!
//! let forest = vec![SourceNode::new(1, "var").child(
//!     SourceNode::new(2, "log")
//!         .child(SourceNode::new(3, "syslog"))
//!         .child(SourceNode::new(4, "kern.log")),
//! )];
//!
//! let hits = search(&forest, "var/log$", &SearchOptions::default());
//! let ids: Vec<_> = hits.iter().map(|m| m.node_id.as_str()).collect();
//! assert_eq!(ids, ["2"]);
//!
//! assert!(search(&forest, "[", &SearchOptions::default()).is_empty());
//! ```

use regex::{Regex, RegexBuilder};

use crate::node::SourceNode;

/// Default segment delimiter.
pub const DEFAULT_DELIMITER: char = '/';

/// Options controlling pattern compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchOptions {
    /// Compile every segment case-insensitively.
    pub ignore_case: bool,
    /// Reserved character separating path segments.
    pub delimiter: char,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            ignore_case: false,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl SearchOptions {
    /// Set case-insensitive matching.
    #[must_use]
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Set the segment delimiter.
    #[must_use]
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// A node that completed the pattern, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchMatch {
    /// Normalized id of the matched node.
    pub node_id: String,
}

/// A pattern compiled into ordered segment regexes.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    segments: Vec<Regex>,
    fallback: bool,
}

fn build(segment: &str, options: &SearchOptions) -> Result<Regex, regex::Error> {
    RegexBuilder::new(segment)
        .case_insensitive(options.ignore_case)
        .build()
}

impl CompiledPattern {
    /// Compile a pattern.
    ///
    /// Returns `None` only when both the per-segment and the whole-pattern
    /// compilation fail.
    #[must_use]
    pub fn compile(pattern: &str, options: &SearchOptions) -> Option<Self> {
        let parts: Vec<&str> = pattern
            .split(options.delimiter)
            .filter(|s| !s.is_empty())
            .collect();

        let per_segment: Result<Vec<Regex>, regex::Error> =
            parts.iter().map(|part| build(part, options)).collect();

        match per_segment {
            Ok(segments) => Some(Self {
                segments,
                fallback: false,
            }),
            Err(segment_err) => match build(pattern, options) {
                Ok(whole) => {
                    tracing::debug!(
                        message = "vtree.search.fallback",
                        error = %segment_err
                    );
                    Some(Self {
                        segments: vec![whole],
                        fallback: true,
                    })
                }
                Err(err) => {
                    tracing::warn!(
                        message = "vtree.search.invalid_pattern",
                        error = %err
                    );
                    None
                }
            },
        }
    }

    /// Compiled segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Regex] {
        &self.segments
    }

    /// Whether the whole pattern was compiled as one segment after a
    /// per-segment failure.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Run the depth-first match over a forest.
    #[must_use]
    pub fn find(&self, forest: &[SourceNode]) -> Vec<SearchMatch> {
        let mut matches = Vec::new();
        if self.segments.is_empty() {
            return matches;
        }
        let last = self.segments.len() - 1;

        // Worklist of (node, segment index); children are pushed in reverse so
        // they pop left to right, keeping discovery in document order.
        let mut stack: Vec<(&SourceNode, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();
        while let Some((node, segment)) = stack.pop() {
            let Some(regex) = self.segments.get(segment) else {
                continue;
            };
            let next = if regex.is_match(node.name()) {
                if segment == last {
                    matches.push(SearchMatch {
                        node_id: node.id().to_string(),
                    });
                    0
                } else {
                    segment + 1
                }
            } else {
                0
            };
            stack.extend(node.children().iter().rev().map(|child| (child, next)));
        }
        matches
    }
}

/// Search a forest for nodes completing `pattern`.
///
/// Never fails: invalid patterns yield an empty list.
#[must_use]
pub fn search(forest: &[SourceNode], pattern: &str, options: &SearchOptions) -> Vec<SearchMatch> {
    let Some(compiled) = CompiledPattern::compile(pattern, options) else {
        return Vec::new();
    };
    let matches = compiled.find(forest);
    tracing::debug!(
        message = "vtree.search",
        pattern_len = pattern.len(),
        segments = compiled.segments().len(),
        fallback = compiled.is_fallback(),
        matches = matches.len()
    );
    matches
}
