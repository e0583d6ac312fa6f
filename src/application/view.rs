//! Top-level composition: memoized forest, expansion state and render output.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::memo::ForestMemo;
use crate::application::render::{RenderedTree, TreeRenderer};
use crate::application::state::{ExpansionState, NodeState};
use crate::application::ApplicationResult;
use crate::domain::{DomainError, Forest, NodeId};

/// Default placeholder shown when there is nothing to render.
pub const DEFAULT_EMPTY_MESSAGE: &str = "No hierarchy found";

/// What the view shows for the current input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// No roots: a single informational placeholder, no tree, no controls
    Empty { message: String },
    Tree(RenderedTree),
}

impl Rendered {
    pub fn is_empty(&self) -> bool {
        matches!(self, Rendered::Empty { .. })
    }
}

/// Interactive hierarchy view.
///
/// Owns the forest for the current input and the expand/collapse state of
/// its nodes. The forest stays a plain value; all UI state lives here.
#[derive(Debug)]
pub struct HierarchyView {
    memo: ForestMemo,
    state: ExpansionState,
    renderer: TreeRenderer,
    empty_message: String,
}

impl Default for HierarchyView {
    fn default() -> Self {
        Self::new(TreeRenderer::default(), DEFAULT_EMPTY_MESSAGE)
    }
}

impl HierarchyView {
    pub fn new(renderer: TreeRenderer, empty_message: impl Into<String>) -> Self {
        Self {
            memo: ForestMemo::new(),
            state: ExpansionState::new(),
            renderer,
            empty_message: empty_message.into(),
        }
    }

    /// Feed the input for this render cycle.
    ///
    /// Rebuilds only when the content changed. After a rebuild, state entries
    /// for ids no longer present are dropped. Returns true on rebuild.
    #[instrument(level = "debug", skip_all)]
    pub fn update(&mut self, value: Option<&Value>) -> bool {
        if !self.memo.refresh(value) {
            return false;
        }
        let forest = self.memo.forest();
        let before = self.state.len();
        self.state.retain(|id| forest.contains(id));
        debug!(pruned = before - self.state.len(), "expansion state pruned");
        true
    }

    pub fn forest(&self) -> &Forest {
        self.memo.forest()
    }

    pub fn state(&self) -> &ExpansionState {
        &self.state
    }

    /// Number of forest builds so far.
    pub fn builds(&self) -> usize {
        self.memo.builds()
    }

    /// Whether `id` has a row in the current render.
    pub fn is_shown(&self, id: NodeId) -> bool {
        self.renderer
            .render(self.memo.forest(), &self.state)
            .row(id)
            .is_some()
    }

    /// Toggle a node between expanded and collapsed.
    ///
    /// Returns the new state, or None for a leaf (no-op). Only shown nodes
    /// can be toggled; a node inside a collapsed subtree has no state.
    /// Collapsing unmounts the subtree: descendant states are dropped, so
    /// expanding again shows them at their defaults.
    pub fn toggle(&mut self, id: NodeId) -> ApplicationResult<Option<NodeState>> {
        let forest = self.memo.forest();
        let idx = forest.index_of(id).ok_or(DomainError::UnknownNode(id))?;
        if !self.is_shown(id) {
            return Err(DomainError::HiddenNode(id).into());
        }
        if forest.node(idx).map_or(true, |n| n.is_leaf()) {
            debug!(node = %id, "toggle on leaf ignored");
            return Ok(None);
        }

        let next = self.state.toggle(id);
        if next == NodeState::Collapsed {
            let descendants: Vec<NodeId> = forest
                .iter_from(idx)
                .map(|(_, n)| n.id)
                .filter(|&d| d != id)
                .collect();
            for d in descendants {
                self.state.forget(d);
            }
        }
        debug!(node = %id, state = ?next, "toggled");
        Ok(Some(next))
    }

    /// Collapse every root that has children.
    ///
    /// Everything below the roots is unmounted, so no deeper state is kept.
    pub fn collapse_all(&mut self) {
        self.state.clear();
        let forest = self.memo.forest();
        let roots: Vec<NodeId> = forest
            .root_indices()
            .iter()
            .filter_map(|&idx| forest.node(idx))
            .filter(|n| !n.is_leaf())
            .map(|n| n.id)
            .collect();
        for id in roots {
            self.state.set(id, NodeState::Collapsed);
        }
    }

    /// Reset every node to expanded.
    pub fn expand_all(&mut self) {
        self.state.clear();
    }

    pub fn render(&self) -> Rendered {
        let forest = self.memo.forest();
        if forest.is_empty() {
            return Rendered::Empty {
                message: self.empty_message.clone(),
            };
        }
        Rendered::Tree(self.renderer.render(forest, &self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed() -> Value {
        json!([
            {"id": 1, "parentId": null, "childIds": [2, 3]},
            {"id": 2, "parentId": 1, "childIds": [4]},
            {"id": 3, "parentId": 1, "childIds": []},
            {"id": 4, "parentId": 2, "childIds": []}
        ])
    }

    #[test]
    fn given_no_input_when_rendering_then_shows_placeholder() {
        let mut view = HierarchyView::default();
        view.update(None);
        assert_eq!(
            view.render(),
            Rendered::Empty {
                message: DEFAULT_EMPTY_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn given_unknown_id_when_toggling_then_errors() {
        let mut view = HierarchyView::default();
        view.update(Some(&seed()));
        assert!(view.toggle(NodeId(99)).is_err());
    }

    #[test]
    fn given_node_under_collapsed_parent_when_toggling_then_errors() {
        let mut view = HierarchyView::default();
        view.update(Some(&seed()));
        view.toggle(NodeId(1)).unwrap();

        let err = view.toggle(NodeId(2)).unwrap_err();

        assert_eq!(err.to_string(), "node 2 is not shown, expand its ancestors first");
        assert_eq!(view.state().collapsed(), vec![NodeId(1)]);
    }

    #[test]
    fn given_leaf_when_toggling_then_is_noop() {
        let mut view = HierarchyView::default();
        view.update(Some(&seed()));
        assert_eq!(view.toggle(NodeId(3)).unwrap(), None);
        assert!(view.state().is_empty());
    }
}
