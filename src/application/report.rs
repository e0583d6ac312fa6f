//! Structural validation report over a record set.

use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::instrument;

use crate::domain::{Fault, ForestBuilder, HierarchyRecord, NodeId};

/// Data consistency findings for one record set.
///
/// Building and rendering tolerate all of these; the report makes them visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyReport {
    pub records: usize,
    pub nodes: usize,
    pub roots: Vec<NodeId>,
    pub depth: usize,
    pub leaves: usize,
    /// Ids given by more than one record
    pub duplicates: Vec<NodeId>,
    /// Roots that are also listed as somebody's child
    pub dual_memberships: Vec<NodeId>,
    /// Nodes no root reaches
    pub detached: Vec<NodeId>,
    pub dangling: Vec<Fault>,
    pub cycles: Vec<Fault>,
}

impl HierarchyReport {
    #[instrument(level = "debug", skip(records), fields(records = records.len()))]
    pub fn inspect(records: &[HierarchyRecord]) -> Self {
        let forest = ForestBuilder::build(records);

        let mut counts: BTreeMap<NodeId, usize> = BTreeMap::new();
        for r in records {
            *counts.entry(r.id).or_default() += 1;
        }
        let duplicates = counts
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(id, _)| id)
            .collect();

        let cycles = forest
            .back_edges()
            .into_iter()
            .map(|(parent, child)| Fault::StructuralCycle { parent, child })
            .collect();

        Self {
            records: records.len(),
            nodes: forest.node_count(),
            roots: forest.root_ids().into_iter().unique().collect(),
            depth: forest.depth(),
            leaves: forest.leaf_ids().len(),
            duplicates,
            dual_memberships: forest.dual_memberships(),
            detached: forest.detached(),
            dangling: ForestBuilder::dangling_references(records),
            cycles,
        }
    }

    /// Number of findings across all categories.
    pub fn issue_count(&self) -> usize {
        self.duplicates.len()
            + self.dual_memberships.len()
            + self.detached.len()
            + self.dangling.len()
            + self.cycles.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}
