//! Per-node expand/collapse state keyed by node id.

use std::collections::HashMap;

use crate::domain::NodeId;

/// Display state of a node with children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Expanded,
    Collapsed,
}

impl NodeState {
    pub fn toggled(self) -> Self {
        match self {
            NodeState::Expanded => NodeState::Collapsed,
            NodeState::Collapsed => NodeState::Expanded,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == NodeState::Expanded
    }
}

/// Expansion state for the nodes of one view.
///
/// Nodes without an entry are expanded. Dropping an entry resets the node
/// to the default.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    states: HashMap<NodeId, NodeState>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> NodeState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    pub fn set(&mut self, id: NodeId, state: NodeState) {
        self.states.insert(id, state);
    }

    /// Flip the state of `id` and return the new state.
    pub fn toggle(&mut self, id: NodeId) -> NodeState {
        let next = self.get(id).toggled();
        self.states.insert(id, next);
        next
    }

    pub fn forget(&mut self, id: NodeId) {
        self.states.remove(&id);
    }

    /// Keep only the entries whose id satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.states.retain(|&id, _| keep(id));
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Ids currently collapsed, ascending.
    pub fn collapsed(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self
            .states
            .iter()
            .filter(|(_, state)| !state.is_expanded())
            .map(|(&id, _)| id)
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_unknown_node_when_getting_state_then_defaults_to_expanded() {
        let state = ExpansionState::new();
        assert_eq!(state.get(NodeId(42)), NodeState::Expanded);
    }

    #[test]
    fn given_node_when_toggling_twice_then_returns_to_expanded() {
        let mut state = ExpansionState::new();
        assert_eq!(state.toggle(NodeId(1)), NodeState::Collapsed);
        assert_eq!(state.collapsed(), vec![NodeId(1)]);
        assert_eq!(state.toggle(NodeId(1)), NodeState::Expanded);
        assert!(state.collapsed().is_empty());
    }

    #[test]
    fn given_forgotten_node_when_getting_state_then_resets_to_default() {
        let mut state = ExpansionState::new();
        state.set(NodeId(3), NodeState::Collapsed);
        state.forget(NodeId(3));
        assert_eq!(state.get(NodeId(3)), NodeState::Expanded);
        assert!(state.is_empty());
    }
}
