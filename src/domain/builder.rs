//! Forest builder: flat hierarchy records to an ordered forest.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::domain::arena::Forest;
use crate::domain::entities::HierarchyRecord;
use crate::domain::error::{DomainError, Fault};

/// Constructs forests from hierarchy records.
///
/// Building is pure: the same records always produce the same forest,
/// including root and child order.
pub struct ForestBuilder;

impl ForestBuilder {
    /// Build a forest in two passes.
    ///
    /// 1. One node per record id; a repeated id keeps its node and takes the
    ///    declared parent of the last record.
    /// 2. For every record in scan order, link each known child id (unknown
    ///    ids are dropped), then add the record's node to the roots if it has
    ///    no declared parent.
    #[instrument(level = "debug", skip(records), fields(records = records.len()))]
    pub fn build(records: &[HierarchyRecord]) -> Forest {
        let mut forest = Forest::new();

        for record in records {
            forest.insert_node(record.id, record.parent_id);
        }

        for record in records {
            let Some(node_idx) = forest.index_of(record.id) else {
                continue;
            };
            for &child in &record.child_ids {
                if let Some(child_idx) = forest.index_of(child) {
                    forest.link(node_idx, child_idx);
                }
            }
            if record.is_root() {
                forest.push_root(node_idx);
            }
        }

        debug!(
            nodes = forest.node_count(),
            roots = forest.root_indices().len(),
            "forest built"
        );
        forest
    }

    /// Build from an untyped value as delivered by the integration layer.
    ///
    /// Absent or non-sequence input yields an empty forest.
    pub fn build_from_value(value: Option<&Value>) -> Forest {
        Self::build(&Self::decode(value))
    }

    /// Decode records from an untyped value, skipping entries that do not decode.
    #[instrument(level = "debug", skip(value))]
    pub fn decode(value: Option<&Value>) -> Vec<HierarchyRecord> {
        match value {
            None => {
                debug!("no input supplied, using empty record list");
                Vec::new()
            }
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(position, item)| match HierarchyRecord::deserialize(item) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        let err = DomainError::InvalidRecord {
                            position,
                            message: e.to_string(),
                        };
                        warn!("{}, skipping", err);
                        None
                    }
                })
                .collect(),
            Some(other) => {
                let fault = Fault::MalformedInput {
                    found: value_kind(other).to_string(),
                };
                warn!("{}, using empty record list", fault);
                Vec::new()
            }
        }
    }

    /// Child references that name no record.
    ///
    /// The build drops these silently; this is for validation reports.
    pub fn dangling_references(records: &[HierarchyRecord]) -> Vec<Fault> {
        let known: HashSet<_> = records.iter().map(|r| r.id).collect();
        records
            .iter()
            .flat_map(|r| {
                r.child_ids
                    .iter()
                    .filter(|c| !known.contains(c))
                    .map(move |&child| Fault::DanglingReference {
                        parent: r.id,
                        child,
                    })
            })
            .collect()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
