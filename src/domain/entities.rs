//! Domain entities: node identifiers and input records

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a person in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One input entry: a node's id, its declared parent and its declared children.
///
/// Accepts the field names used by upstream sources:
/// - `id`, `user_Id` or `userId`
/// - `parentId`, `prev_Id` or `parent_id` (`null` or missing means root)
/// - `childIds`, `next_Id` or `child_ids` (`null` or missing means none)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyRecord {
    #[serde(alias = "user_Id", alias = "userId")]
    pub id: NodeId,
    #[serde(default, alias = "prev_Id", alias = "parent_id")]
    pub parent_id: Option<NodeId>,
    #[serde(
        default,
        alias = "next_Id",
        alias = "child_ids",
        deserialize_with = "null_as_empty"
    )]
    pub child_ids: Vec<NodeId>,
}

impl HierarchyRecord {
    pub fn new(
        id: i64,
        parent_id: Option<i64>,
        child_ids: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            id: NodeId(id),
            parent_id: parent_id.map(NodeId),
            child_ids: child_ids.into_iter().map(NodeId).collect(),
        }
    }

    /// A record without a declared parent starts a tree.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<NodeId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<NodeId>>::deserialize(deserializer)?.unwrap_or_default())
}
