/*
Conversion of a forest into termtree values for plain, fully expanded output.

termtree draws its own connectors, so expansion state does not apply here.
 */
use std::collections::HashSet;

use generational_arena::Index;
use termtree::Tree;
use tracing::{instrument, warn};

use crate::domain::arena::Forest;
use crate::domain::NodeId;

pub trait ToTermTree {
    /// One tree per root, labelled by `label`, at most `max_depth` levels deep
    /// and `max_nodes` nodes in total.
    fn to_term_trees(
        &self,
        label: &dyn Fn(NodeId) -> String,
        max_depth: usize,
        max_nodes: usize,
    ) -> Vec<Tree<String>>;
}

impl ToTermTree for Forest {
    #[instrument(level = "debug", skip(self, label))]
    fn to_term_trees(
        &self,
        label: &dyn Fn(NodeId) -> String,
        max_depth: usize,
        max_nodes: usize,
    ) -> Vec<Tree<String>> {
        struct Walk<'f> {
            label: &'f dyn Fn(NodeId) -> String,
            max_depth: usize,
            budget: usize,
            on_path: HashSet<NodeId>,
        }

        fn build_tree(
            forest: &Forest,
            node_idx: Index,
            depth: usize,
            walk: &mut Walk<'_>,
        ) -> Option<Tree<String>> {
            let node = forest.node(node_idx)?;
            if walk.budget == 0 {
                return None;
            }
            if !walk.on_path.insert(node.id) {
                warn!(node = %node.id, "cycle in hierarchy, not descending");
                return None;
            }
            walk.budget -= 1;
            let mut tree = Tree::new((walk.label)(node.id));
            if depth + 1 < walk.max_depth {
                for &child_idx in &node.children {
                    if let Some(child) = build_tree(forest, child_idx, depth + 1, walk) {
                        tree.push(child);
                    }
                }
            }
            walk.on_path.remove(&node.id);
            Some(tree)
        }

        let mut walk = Walk {
            label,
            max_depth,
            budget: max_nodes,
            on_path: HashSet::new(),
        };
        let trees = self
            .root_indices()
            .iter()
            .filter_map(|&root| build_tree(self, root, 0, &mut walk))
            .collect();
        if walk.budget == 0 {
            warn!(max_nodes, "node limit reached, plain tree truncated");
        }
        trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForestBuilder, HierarchyRecord};

    #[test]
    fn given_seed_forest_when_converting_then_nests_children() {
        let forest = ForestBuilder::build(&[
            HierarchyRecord::new(1, None, [2, 3]),
            HierarchyRecord::new(2, Some(1), []),
            HierarchyRecord::new(3, Some(1), []),
        ]);
        let trees = forest.to_term_trees(&|id| format!("User {id}"), 64, 100);

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].root, "User 1");
        assert_eq!(trees[0].leaves.len(), 2);
        assert_eq!(trees[0].leaves[1].root, "User 3");
    }

    #[test]
    fn given_self_reference_when_converting_then_terminates() {
        let forest = ForestBuilder::build(&[HierarchyRecord::new(1, None, [1])]);
        let trees = forest.to_term_trees(&|id| id.to_string(), 64, 100);

        assert_eq!(trees.len(), 1);
        assert!(trees[0].leaves.is_empty());
    }

    #[test]
    fn given_node_budget_when_converting_then_stops_at_budget() {
        let forest = ForestBuilder::build(&[
            HierarchyRecord::new(1, None, [2, 3]),
            HierarchyRecord::new(2, Some(1), []),
            HierarchyRecord::new(3, Some(1), []),
            HierarchyRecord::new(4, None, []),
        ]);
        let trees = forest.to_term_trees(&|id| id.to_string(), 64, 2);

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].leaves.len(), 1);
        assert_eq!(trees[0].leaves[0].root, "2");
    }
}
