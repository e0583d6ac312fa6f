use std::collections::{BTreeMap, HashSet};

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::instrument;

use crate::domain::NodeId;

/// Tree node in the arena-based forest.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Identity of the person this node stands for
    pub id: NodeId,
    /// Id of the last node that listed this one as a child, None if never linked
    pub parent_id: Option<NodeId>,
    /// Parent as declared by the record itself
    pub declared_parent: Option<NodeId>,
    /// Indices of child nodes in the arena, in declaration order
    pub children: Vec<Index>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-based forest built from flat hierarchy records.
///
/// Children are arena indices, so inconsistent input can make one node
/// reachable from several places or from itself. Traversals carry the set of
/// ids on the current descent path and never re-enter one of them.
#[derive(Debug, Clone)]
pub struct Forest {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Lookup from node id to arena index
    index: BTreeMap<NodeId, Index>,
    /// Root indices in record scan order
    roots: Vec<Index>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: BTreeMap::new(),
            roots: Vec::new(),
        }
    }

    /// Insert a node for `id`, or refresh the declared parent of the existing one.
    pub(crate) fn insert_node(&mut self, id: NodeId, declared_parent: Option<NodeId>) -> Index {
        if let Some(&idx) = self.index.get(&id) {
            if let Some(node) = self.arena.get_mut(idx) {
                node.declared_parent = declared_parent;
            }
            return idx;
        }
        let idx = self.arena.insert(TreeNode {
            id,
            parent_id: None,
            declared_parent,
            children: Vec::new(),
        });
        self.index.insert(id, idx);
        idx
    }

    pub(crate) fn link(&mut self, parent_idx: Index, child_idx: Index) {
        let Some(parent_id) = self.arena.get(parent_idx).map(|p| p.id) else {
            return;
        };
        if let Some(parent) = self.arena.get_mut(parent_idx) {
            parent.children.push(child_idx);
        }
        if let Some(child) = self.arena.get_mut(child_idx) {
            child.parent_id = Some(parent_id);
        }
    }

    pub(crate) fn push_root(&mut self, idx: Index) {
        self.roots.push(idx);
    }

    pub fn node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.index_of(id).and_then(|idx| self.arena.get(idx))
    }

    pub fn index_of(&self, id: NodeId) -> Option<Index> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn root_indices(&self) -> &[Index] {
        &self.roots
    }

    pub fn root_ids(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .filter_map(|&idx| self.node(idx))
            .map(|n| n.id)
            .collect()
    }

    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|n| {
                n.children
                    .iter()
                    .filter_map(|&c| self.node(c))
                    .map(|c| c.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of distinct nodes.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// A forest without roots has nothing to show.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Node ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.index.keys().copied()
    }

    /// Pre-order walk from all roots, yielding `(depth, node)`.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(self, self.roots.clone())
    }

    /// Pre-order walk of the subtree below `idx`, the node itself included.
    pub fn iter_from(&self, idx: Index) -> PreOrder<'_> {
        PreOrder::new(self, vec![idx])
    }

    /// Number of levels of the deepest branch reachable from a root.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _)| depth + 1).max().unwrap_or(0)
    }

    /// Ids of reachable nodes without children, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.id)
            .unique()
            .collect()
    }

    /// Roots that some other node also lists as a child.
    pub fn dual_memberships(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .filter_map(|&idx| self.node(idx))
            .filter(|n| n.parent_id.is_some())
            .map(|n| n.id)
            .unique()
            .collect()
    }

    /// Nodes that cannot be reached from any root, in id order.
    pub fn detached(&self) -> Vec<NodeId> {
        let reachable: HashSet<NodeId> = self.iter().map(|(_, n)| n.id).collect();
        self.ids().filter(|id| !reachable.contains(id)).collect()
    }

    /// Child links that point back onto the current descent path.
    ///
    /// Walks from the roots first, then from every node the roots do not
    /// reach, so cycles in detached components are found too.
    pub fn back_edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();

        let mut walk = PreOrder::new(self, self.roots.clone());
        seen.extend(walk.by_ref().map(|(_, n)| n.id));
        edges.append(&mut walk.back_edges);

        for (&id, &idx) in &self.index {
            if seen.contains(&id) {
                continue;
            }
            let mut walk = PreOrder::new(self, vec![idx]);
            seen.extend(walk.by_ref().map(|(_, n)| n.id));
            edges.append(&mut walk.back_edges);
        }

        edges.into_iter().unique().collect()
    }
}

enum Step {
    Enter {
        idx: Index,
        depth: usize,
        parent: Option<NodeId>,
    },
    Leave(NodeId),
}

/// Cycle-safe pre-order iterator over a forest.
pub struct PreOrder<'a> {
    forest: &'a Forest,
    stack: Vec<Step>,
    on_path: HashSet<NodeId>,
    back_edges: Vec<(NodeId, NodeId)>,
}

impl<'a> PreOrder<'a> {
    fn new(forest: &'a Forest, starts: Vec<Index>) -> Self {
        // Reverse so the first start is visited first
        let stack = starts
            .into_iter()
            .rev()
            .map(|idx| Step::Enter {
                idx,
                depth: 0,
                parent: None,
            })
            .collect();
        Self {
            forest,
            stack,
            on_path: HashSet::new(),
            back_edges: Vec::new(),
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(step) = self.stack.pop() {
            match step {
                Step::Leave(id) => {
                    self.on_path.remove(&id);
                }
                Step::Enter { idx, depth, parent } => {
                    let Some(node) = self.forest.node(idx) else {
                        continue;
                    };
                    if self.on_path.contains(&node.id) {
                        if let Some(parent) = parent {
                            self.back_edges.push((parent, node.id));
                        }
                        continue;
                    }
                    self.on_path.insert(node.id);
                    self.stack.push(Step::Leave(node.id));
                    for &child in node.children.iter().rev() {
                        self.stack.push(Step::Enter {
                            idx: child,
                            depth: depth + 1,
                            parent: Some(node.id),
                        });
                    }
                    return Some((depth, node));
                }
            }
        }
        None
    }
}
