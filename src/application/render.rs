//! Tree renderer: forest plus expansion state to display rows
//!
//! Rows are produced by an explicit stack walk. Each descent carries the ids
//! on the current path, so cyclic input ends the branch with a
//! [`Fault::StructuralCycle`] instead of looping.

use std::collections::HashSet;

use generational_arena::Index;
use itertools::{Itertools, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::application::state::ExpansionState;
use crate::domain::{Fault, Forest, NodeId};

/// Default bound on rendered levels.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default bound on emitted rows. Shared children repeat their whole
/// subtree, so row count can grow exponentially with depth.
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// Vertical guide drawn for one ancestor level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guide {
    /// The ancestor at this level has siblings below it
    Pipe,
    /// The ancestor at this level was the last sibling
    Blank,
}

/// Horizontal connector drawn for the node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// More siblings follow
    Tee,
    /// Last sibling
    Elbow,
}

/// Expand/collapse slot of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Expanded,
    Collapsed,
    /// No children: blank placeholder of the same width
    Leaf,
}

/// One rendered node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: NodeId,
    pub guides: Vec<Guide>,
    pub connector: Connector,
    pub toggle: Toggle,
}

impl Row {
    pub fn depth(&self) -> usize {
        self.guides.len()
    }

    pub fn is_last(&self) -> bool {
        self.connector == Connector::Elbow
    }
}

/// Output of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTree {
    pub rows: Vec<Row>,
    /// Faults met while descending, in discovery order
    pub faults: Vec<Fault>,
}

impl RenderedTree {
    pub fn ids(&self) -> Vec<NodeId> {
        self.rows.iter().map(|r| r.id).collect()
    }

    pub fn row(&self, id: NodeId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Plain text lines in `style`.
    pub fn lines(&self, style: &RenderStyle) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| style.row_text(row).to_string())
            .collect()
    }
}

/// Glyph set for connector drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    #[default]
    Unicode,
    Ascii,
}

/// Fixed-width glyphs for one charset.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub pipe: &'static str,
    pub blank: &'static str,
    pub tee: &'static str,
    pub elbow: &'static str,
    pub expanded: &'static str,
    pub collapsed: &'static str,
    pub leaf: &'static str,
}

impl Charset {
    pub fn glyphs(self) -> Glyphs {
        match self {
            Charset::Unicode => Glyphs {
                pipe: "│  ",
                blank: "   ",
                tee: "├─ ",
                elbow: "└─ ",
                expanded: "▾ ",
                collapsed: "▸ ",
                leaf: "  ",
            },
            Charset::Ascii => Glyphs {
                pipe: "|  ",
                blank: "   ",
                tee: "|- ",
                elbow: "`- ",
                expanded: "- ",
                collapsed: "+ ",
                leaf: "  ",
            },
        }
    }
}

/// Text segments of a row, kept apart so the terminal layer can color them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowText {
    pub guides: String,
    pub connector: &'static str,
    pub toggle: &'static str,
    pub label: String,
}

impl std::fmt::Display for RowText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.guides, self.connector, self.toggle, self.label
        )
    }
}

/// How rows turn into text.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub charset: Charset,
    /// Label template, `{id}` is replaced by the node id
    pub label: String,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            charset: Charset::Unicode,
            label: "User {id}".to_string(),
        }
    }
}

impl RenderStyle {
    pub fn label(&self, id: NodeId) -> String {
        self.label.replace("{id}", &id.to_string())
    }

    pub fn row_text(&self, row: &Row) -> RowText {
        let glyphs = self.charset.glyphs();
        let guides = row
            .guides
            .iter()
            .map(|g| match g {
                Guide::Pipe => glyphs.pipe,
                Guide::Blank => glyphs.blank,
            })
            .collect();
        RowText {
            guides,
            connector: match row.connector {
                Connector::Tee => glyphs.tee,
                Connector::Elbow => glyphs.elbow,
            },
            toggle: match row.toggle {
                Toggle::Expanded => glyphs.expanded,
                Toggle::Collapsed => glyphs.collapsed,
                Toggle::Leaf => glyphs.leaf,
            },
            label: self.label(row.id),
        }
    }
}

struct Frame {
    idx: Index,
    guides: Vec<Guide>,
    is_last: bool,
    parent: Option<NodeId>,
}

enum Step {
    Enter(Frame),
    Leave(NodeId),
}

/// Renders a forest into rows.
#[derive(Debug, Clone)]
pub struct TreeRenderer {
    max_depth: usize,
    max_rows: usize,
}

impl Default for TreeRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl TreeRenderer {
    /// `max_depth` is clamped to at least one level.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    /// Stop after `max_rows` rows (at least one).
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    #[instrument(level = "debug", skip_all, fields(roots = forest.root_indices().len()))]
    pub fn render(&self, forest: &Forest, state: &ExpansionState) -> RenderedTree {
        let mut out = RenderedTree::default();
        let mut on_path: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<Step> = Vec::new();

        push_siblings(&mut stack, forest.root_indices(), &[], None);

        while let Some(step) = stack.pop() {
            let frame = match step {
                Step::Leave(id) => {
                    on_path.remove(&id);
                    continue;
                }
                Step::Enter(frame) => frame,
            };
            let Some(node) = forest.node(frame.idx) else {
                continue;
            };

            if on_path.contains(&node.id) {
                if let Some(parent) = frame.parent {
                    let fault = Fault::StructuralCycle {
                        parent,
                        child: node.id,
                    };
                    warn!("{}, not descending", fault);
                    out.faults.push(fault);
                }
                continue;
            }

            if out.rows.len() >= self.max_rows {
                let fault = Fault::RowLimit {
                    limit: self.max_rows,
                };
                warn!("{}", fault);
                out.faults.push(fault);
                break;
            }

            let expanded = state.get(node.id).is_expanded();
            let toggle = match (node.is_leaf(), expanded) {
                (true, _) => Toggle::Leaf,
                (false, true) => Toggle::Expanded,
                (false, false) => Toggle::Collapsed,
            };
            let depth = frame.guides.len();
            out.rows.push(Row {
                id: node.id,
                guides: frame.guides.clone(),
                connector: if frame.is_last {
                    Connector::Elbow
                } else {
                    Connector::Tee
                },
                toggle,
            });

            if toggle != Toggle::Expanded {
                continue;
            }
            if depth + 1 >= self.max_depth {
                let fault = Fault::DepthLimit {
                    parent: node.id,
                    limit: self.max_depth,
                };
                warn!("{}, not descending", fault);
                out.faults.push(fault);
                continue;
            }

            on_path.insert(node.id);
            stack.push(Step::Leave(node.id));
            let mut child_guides = frame.guides;
            child_guides.push(if frame.is_last {
                Guide::Blank
            } else {
                Guide::Pipe
            });
            push_siblings(&mut stack, &node.children, &child_guides, Some(node.id));
        }

        debug!(rows = out.rows.len(), faults = out.faults.len(), "rendered");
        out
    }
}

/// Push siblings so the first one is popped first.
fn push_siblings(
    stack: &mut Vec<Step>,
    siblings: &[Index],
    guides: &[Guide],
    parent: Option<NodeId>,
) {
    let frames = siblings
        .iter()
        .with_position()
        .map(|(position, &idx)| Frame {
            idx,
            guides: guides.to_vec(),
            is_last: matches!(position, Position::Last | Position::Only),
            parent,
        })
        .collect_vec();
    stack.extend(frames.into_iter().rev().map(Step::Enter));
}
