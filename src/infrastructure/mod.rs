//! Infrastructure layer: record sources feeding the core
//!
//! This layer performs the I/O the core stays free of.

pub mod error;
pub mod source;

pub use error::{InfraError, InfraResult};
pub use source::{
    demo_records, parse_json, unwrap_field, DemoSource, FileSource, RecordSource, StdinSource,
};
