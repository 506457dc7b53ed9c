//! Scripted session replay.
//!
//! A script is a JSON array of steps, each tagged by `op`:
//!
//! ```json
//! [
//!   {"op": "range", "first": 0, "last": 19},
//!   {"op": "collapse_all"},
//!   {"op": "pattern", "pattern": "nginx/\\.log$"},
//!   {"op": "next"},
//!   {"op": "save"}
//! ]
//! ```
//!
//! Every host notification the engine emits while replaying is captured as a
//! [`HostEvent`] tagged with the step that caused it.

use serde::{Deserialize, Serialize};
use vtree::{
    ScrollAlign, ScrollBehavior, ScrollRequest, SearchSummary, SourceNode, TreeHost,
    TreePersistState, VirtualTree,
};

use crate::error::Result;

/// One scripted host action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Toggle { id: String },
    Expand { ids: Vec<String> },
    Collapse { ids: Vec<String> },
    ExpandAll,
    CollapseAll,
    Pattern { pattern: String },
    IgnoreCase { enabled: bool },
    GoTo { index: usize },
    Next,
    Previous,
    Clear,
    Range { first: usize, last: usize },
    Select { id: String },
    Reveal { id: String },
    /// Replace the dataset.
    Forest { forest: Vec<SourceNode> },
    /// Snapshot the collapsed set into the event log.
    Save,
    Restore { state: TreePersistState },
}

/// A captured notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Select {
        step: usize,
        id: String,
    },
    Toggle {
        step: usize,
        id: String,
    },
    Summary {
        step: usize,
        active: isize,
        total: usize,
    },
    Scroll {
        step: usize,
        index: usize,
        align: ScrollAlign,
        behavior: ScrollBehavior,
    },
    Saved {
        step: usize,
        state: TreePersistState,
    },
}

/// Host that records notifications.
#[derive(Debug, Default)]
pub struct RecordingHost {
    step: usize,
    events: Vec<HostEvent>,
}

impl RecordingHost {
    #[must_use]
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<HostEvent> {
        self.events
    }
}

impl TreeHost for RecordingHost {
    fn on_select(&mut self, node: &SourceNode) {
        self.events.push(HostEvent::Select {
            step: self.step,
            id: node.id().to_string(),
        });
    }

    fn on_toggle(&mut self, node: &SourceNode) {
        self.events.push(HostEvent::Toggle {
            step: self.step,
            id: node.id().to_string(),
        });
    }

    fn on_search_summary(&mut self, summary: SearchSummary) {
        let (active, total) = summary.as_signed();
        self.events.push(HostEvent::Summary {
            step: self.step,
            active,
            total,
        });
    }

    fn on_scroll_request(&mut self, request: ScrollRequest) {
        self.events.push(HostEvent::Scroll {
            step: self.step,
            index: request.index,
            align: request.align,
            behavior: request.behavior,
        });
    }
}

/// Parse a script from JSON.
pub fn parse_script(json: &str) -> Result<Vec<Step>> {
    Ok(serde_json::from_str(json)?)
}

/// Apply one step.
///
/// Steps naming unknown ids are no-ops, as in the engine.
pub fn apply(session: &mut VirtualTree<RecordingHost>, step: &Step) {
    match step {
        Step::Toggle { id } => {
            session.toggle(id);
        }
        Step::Expand { ids } => {
            session.expand(ids.iter().map(String::as_str));
        }
        Step::Collapse { ids } => {
            session.collapse(ids.iter().map(String::as_str));
        }
        Step::ExpandAll => {
            session.expand_all();
        }
        Step::CollapseAll => {
            session.collapse_all();
        }
        Step::Pattern { pattern } => session.set_pattern(pattern),
        Step::IgnoreCase { enabled } => {
            let options = session.search_options().ignore_case(*enabled);
            session.set_search_options(options);
        }
        Step::GoTo { index } => {
            session.go_to_match(*index);
        }
        Step::Next => {
            session.next_match();
        }
        Step::Previous => {
            session.previous_match();
        }
        Step::Clear => session.clear_pattern(),
        Step::Range { first, last } => session.set_visible_range(*first, *last),
        Step::Select { id } => {
            session.select(id);
        }
        Step::Reveal { id } => {
            session.set_active_selection(id);
        }
        Step::Forest { forest } => session.set_forest(forest.clone()),
        Step::Save => {
            let state = session.save_state();
            let host = session.host_mut();
            let step = host.step;
            host.events.push(HostEvent::Saved { step, state });
        }
        Step::Restore { state } => {
            session.restore_state(state);
        }
    }
}

/// Replay every step in order.
pub fn replay(session: &mut VirtualTree<RecordingHost>, steps: &[Step]) {
    for (index, step) in steps.iter().enumerate() {
        session.host_mut().step = index;
        tracing::debug!(message = "harness.step", index, step = ?step);
        apply(session, step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Vec<SourceNode> {
        vec![
            SourceNode::new("root", "root")
                .child(SourceNode::new("leaf1", "leaf1"))
                .child(SourceNode::new("leaf2", "leaf2")),
        ]
    }

    #[test]
    fn parses_tagged_steps() {
        let steps = parse_script(
            r#"[
                {"op": "toggle", "id": "root"},
                {"op": "pattern", "pattern": "leaf"},
                {"op": "go_to", "index": 1},
                {"op": "range", "first": 0, "last": 9},
                {"op": "restore", "state": {"collapsed_ids": ["root"]}}
            ]"#,
        )
        .unwrap();
        assert_eq!(steps[0], Step::Toggle { id: "root".into() });
        assert_eq!(steps[2], Step::GoTo { index: 1 });
        assert!(matches!(&steps[4], Step::Restore { state } if state.collapsed_ids.len() == 1));
    }

    #[test]
    fn unknown_op_is_rejected() {
        assert!(parse_script(r#"[{"op": "explode"}]"#).is_err());
    }

    #[test]
    fn replay_records_events_by_step() {
        let mut session = VirtualTree::with_host(forest(), RecordingHost::default());
        let steps = vec![
            Step::Range { first: 0, last: 2 },
            Step::Pattern {
                pattern: "leaf".into(),
            },
            Step::Next,
            Step::Toggle { id: "root".into() },
            Step::Toggle { id: "missing".into() },
            Step::Save,
        ];
        replay(&mut session, &steps);

        let events = session.into_host().into_events();
        assert_eq!(
            events,
            [
                HostEvent::Summary {
                    step: 1,
                    active: 0,
                    total: 2
                },
                HostEvent::Summary {
                    step: 2,
                    active: 1,
                    total: 2
                },
                HostEvent::Toggle {
                    step: 3,
                    id: "root".into()
                },
                HostEvent::Saved {
                    step: 5,
                    state: TreePersistState {
                        collapsed_ids: ["root".to_owned()].into_iter().collect()
                    }
                },
            ]
        );
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = HostEvent::Scroll {
            step: 4,
            index: 12,
            align: ScrollAlign::Center,
            behavior: ScrollBehavior::Smooth,
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"scroll","step":4,"index":12,"align":"center","behavior":"smooth"}"#
        );
    }
}
