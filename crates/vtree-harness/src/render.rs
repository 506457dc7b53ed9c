//! Plain-text rendering of visible rows.

use vtree::{FlatTree, RowView, TreeHost, VirtualTree};

/// Guide character styles for row rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Guides {
    /// ASCII guides: `|`, `+--`, `` `-- ``.
    Ascii,
    /// Unicode box-drawing characters (default).
    #[default]
    Unicode,
    /// Rounded Unicode characters.
    Rounded,
}

impl Guides {
    /// Vertical continuation (ancestor has siblings below).
    #[must_use]
    pub const fn vertical(&self) -> &str {
        match self {
            Self::Ascii => "|   ",
            Self::Unicode | Self::Rounded => "\u{2502}   ",
        }
    }

    /// Branch guide (row has siblings below).
    #[must_use]
    pub const fn branch(&self) -> &str {
        match self {
            Self::Ascii => "+-- ",
            Self::Unicode | Self::Rounded => "\u{251C}\u{2500}\u{2500} ",
        }
    }

    /// Last-child guide.
    #[must_use]
    pub const fn last(&self) -> &str {
        match self {
            Self::Ascii => "`-- ",
            Self::Unicode => "\u{2514}\u{2500}\u{2500} ",
            Self::Rounded => "\u{2570}\u{2500}\u{2500} ",
        }
    }

    #[must_use]
    pub const fn space(&self) -> &str {
        "    "
    }

    /// Fold marker for a non-leaf row.
    #[must_use]
    pub const fn fold(&self, open: bool) -> &str {
        match (self, open) {
            (Self::Ascii, true) => "[-] ",
            (Self::Ascii, false) => "[+] ",
            (_, true) => "\u{25BE} ",
            (_, false) => "\u{25B8} ",
        }
    }
}

fn is_last_sibling(tree: &FlatTree, index: usize) -> bool {
    let Some(record) = tree.record(index) else {
        return true;
    };
    match record.parent() {
        Some(parent) => tree
            .record(parent)
            .and_then(|p| p.children().last())
            .is_none_or(|&last| last == index),
        None => true,
    }
}

/// Render one row: status markers, guides, fold marker, name.
///
/// Markers are `>` for the active selection, `*` for a search match, and `@`
/// for the selected node.
#[must_use]
pub fn render_row(tree: &FlatTree, row: &RowView<'_>, guides: Guides) -> String {
    let mut line = String::new();
    line.push(if row.is_active_selection { '>' } else { ' ' });
    line.push(if row.is_search_match { '*' } else { ' ' });
    line.push(if row.is_selected { '@' } else { ' ' });
    line.push(' ');

    let index = row.record.index();
    if row.record.level() > 0 {
        // Ancestors below the root, outermost first.
        let mut chain: Vec<usize> = tree.ancestors(index).collect();
        chain.pop();
        for &ancestor in chain.iter().rev() {
            line.push_str(if is_last_sibling(tree, ancestor) {
                guides.space()
            } else {
                guides.vertical()
            });
        }
        line.push_str(if is_last_sibling(tree, index) {
            guides.last()
        } else {
            guides.branch()
        });
    }

    if !row.record.is_leaf() {
        line.push_str(guides.fold(row.is_open));
    }
    line.push_str(row.record.name());
    line
}

/// Render the displayed rows in `[first, last]`.
#[must_use]
pub fn render_window<H: TreeHost>(
    tree: &VirtualTree<H>,
    first: usize,
    last: usize,
    guides: Guides,
) -> Vec<String> {
    tree.rows(first..last.saturating_add(1))
        .map(|row| render_row(tree.tree(), &row, guides))
        .collect()
}
