#![forbid(unsafe_code)]

//! End-to-end session tests.
//!
//! These drive a [`VirtualTree`] the way a list-view host would:
//! - Render a window of rows
//! - Toggle and bulk expand/collapse
//! - Search, step through matches, follow scroll requests
//! - Replace the dataset mid-session

use tracing::Level;
use vtree::{
    NavState, ScrollRequest, SearchSummary, SourceNode, TreeHost, VirtualTree, flatten, search,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

/// Host that keeps the last reported state and applies scroll requests to
/// its own window, as a real list view would.
#[derive(Debug, Default)]
struct ListHost {
    height: usize,
    top: usize,
    summaries: Vec<SearchSummary>,
    toggled: Vec<String>,
    selected: Option<String>,
    scrolls: usize,
}

impl ListHost {
    fn new(height: usize) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    fn window(&self) -> (usize, usize) {
        (self.top, self.top + self.height - 1)
    }
}

impl TreeHost for ListHost {
    fn on_select(&mut self, node: &SourceNode) {
        self.selected = Some(node.id().to_string());
    }

    fn on_toggle(&mut self, node: &SourceNode) {
        self.toggled.push(node.id().to_string());
    }

    fn on_search_summary(&mut self, summary: SearchSummary) {
        self.summaries.push(summary);
    }

    fn on_scroll_request(&mut self, request: ScrollRequest) {
        self.top = request.index.saturating_sub(self.height / 2);
        self.scrolls += 1;
    }
}

/// Push the host's window back into the session after it scrolled.
fn sync(tree: &mut VirtualTree<ListHost>) {
    let (first, last) = tree.host().window();
    tree.set_visible_range(first, last);
}

fn file_system() -> Vec<SourceNode> {
    let logs = (0..40)
        .map(|i| SourceNode::new(format!("/var/log/app{i}.log"), format!("app{i}.log")))
        .collect();
    vec![
        SourceNode::new("/etc", "etc")
            .child(SourceNode::new("/etc/hosts", "hosts"))
            .child(SourceNode::new("/etc/nginx", "nginx").child(SourceNode::new(
                "/etc/nginx/nginx.conf",
                "nginx.conf",
            ))),
        SourceNode::new("/var", "var").child(
            SourceNode::new("/var/log", "log")
                .with_children(logs)
                .child(
                    SourceNode::new("/var/log/nginx", "nginx")
                        .child(SourceNode::new("/var/log/nginx/access.log", "access.log"))
                        .child(SourceNode::new("/var/log/nginx/error.log", "error.log")),
                ),
        ),
    ]
}

#[test]
fn baseline_acceptance_scenario() {
    init_tracing();
    let forest = vec![
        SourceNode::new("root", "root")
            .child(SourceNode::new("leaf1", "leaf1"))
            .child(SourceNode::new("leaf2", "leaf2")),
    ];

    let flat = flatten(&forest);
    let levels: Vec<_> = flat.iter().map(|r| (r.id(), r.level())).collect();
    assert_eq!(levels, [("root", 0), ("leaf1", 1), ("leaf2", 1)]);

    let hits = search::search(&forest, "leaf1", &Default::default());
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node_id, "leaf1");

    let mut tree = VirtualTree::new(forest);
    assert_eq!(tree.descendant_ids("root"), ["leaf1", "leaf2"]);
    tree.collapse(["root"]);
    let visible: Vec<_> = tree.visible_rows().map(|r| r.record.id()).collect();
    assert_eq!(visible, ["root"]);
}

#[test]
fn browse_search_and_navigate() {
    init_tracing();
    let mut tree = VirtualTree::with_host(file_system(), ListHost::new(10));
    sync(&mut tree);
    assert_eq!(tree.visible_len(), 49);

    // Collapse everything, open two levels by hand.
    tree.collapse_all();
    assert_eq!(tree.visible_len(), 2);
    assert!(tree.toggle("/var"));
    assert!(tree.toggle("/var/log"));
    assert_eq!(tree.host().toggled, ["/var", "/var/log"]);
    assert_eq!(tree.visible_len(), 2 + 1 + 41);

    // Search reopens everything and lands on the first match.
    tree.set_pattern(r"nginx/\.log$");
    assert_eq!(tree.visible_len(), 49);
    assert_eq!(tree.nav_state(), NavState::PatternChanged);
    assert_eq!(
        tree.host().summaries.last(),
        Some(&SearchSummary {
            active: Some(0),
            total: 2
        })
    );
    // access.log is far below the window, so the host scrolled to it.
    assert_eq!(tree.host().scrolls, 1);
    sync(&mut tree);
    let active = tree.active_selection().map(|r| r.id().to_owned());
    assert_eq!(active.as_deref(), Some("/var/log/nginx/access.log"));

    let (first, last) = tree.host().window();
    let on_screen: Vec<_> = tree
        .rows(first..last + 1)
        .filter(|r| r.is_search_match)
        .map(|r| r.record.id())
        .collect();
    assert_eq!(on_screen, ["/var/log/nginx/access.log", "/var/log/nginx/error.log"]);

    // Stepping to the neighbour needs no scroll; wrapping returns to the first.
    assert!(tree.next_match());
    assert!(tree.next_match());
    assert_eq!(tree.host().scrolls, 1);
    assert_eq!(tree.summary().as_signed(), (0, 2));
    assert_eq!(tree.nav_state(), NavState::Navigating);

    // Selecting is independent of the search.
    assert!(tree.select("/etc/hosts"));
    assert_eq!(tree.host().selected.as_deref(), Some("/etc/hosts"));

    tree.clear_pattern();
    assert_eq!(tree.nav_state(), NavState::Idle);
    assert_eq!(tree.host().summaries.last(), Some(&SearchSummary::default()));
    assert!(tree.active_selection().is_none());
}

#[test]
fn dataset_refresh_keeps_pattern() {
    init_tracing();
    let mut tree = VirtualTree::with_host(file_system(), ListHost::new(10));
    sync(&mut tree);
    tree.set_pattern("error");
    assert_eq!(tree.summary().total, 1);

    let mut refreshed = file_system();
    refreshed.push(SourceNode::new("/tmp", "tmp").child(SourceNode::new(
        "/tmp/error.txt",
        "error.txt",
    )));
    tree.set_forest(refreshed);

    assert_eq!(tree.summary().total, 2);
    assert_eq!(tree.nav().pattern(), "error");
    assert!(tree.selected().is_none());
}

#[test]
fn hidden_target_is_expanded_before_scrolling() {
    init_tracing();
    let mut tree = VirtualTree::with_host(file_system(), ListHost::new(5));
    sync(&mut tree);
    tree.collapse_all();

    assert!(tree.set_active_selection("/var/log/app39.log"));
    assert_eq!(tree.host().scrolls, 1);
    sync(&mut tree);

    let (first, last) = tree.host().window();
    let row = tree
        .rows(first..last + 1)
        .find(|r| r.is_active_selection)
        .map(|r| r.record.id());
    assert_eq!(row, Some("/var/log/app39.log"));
    // /etc stays collapsed.
    assert!(!tree.visibility().is_open(0));
}
