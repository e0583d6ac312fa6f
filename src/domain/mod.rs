//! Domain layer: records, forest construction and traversal
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod convert;
pub mod entities;
pub mod error;

pub use arena::{Forest, PreOrder, TreeNode};
pub use builder::ForestBuilder;
pub use convert::ToTermTree;
pub use entities::*;
pub use error::{DomainError, Fault};
