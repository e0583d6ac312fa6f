//! Application layer: expansion state, memoization, rendering and reports
//!
//! This layer orchestrates domain logic; it performs no I/O.

pub mod error;
pub mod memo;
pub mod render;
pub mod report;
pub mod state;
pub mod view;

pub use error::{ApplicationError, ApplicationResult};
pub use memo::{fingerprint, ForestMemo};
pub use render::{
    Charset, Connector, Guide, RenderStyle, RenderedTree, Row, RowText, Toggle, TreeRenderer,
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_ROWS,
};
pub use report::HierarchyReport;
pub use state::{ExpansionState, NodeState};
pub use view::{HierarchyView, Rendered, DEFAULT_EMPTY_MESSAGE};
