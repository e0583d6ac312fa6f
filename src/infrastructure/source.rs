//! Record sources: where the flat hierarchy records come from
//!
//! Sources return the raw JSON value. Unwrapping an enclosing object and
//! handing the value to the core happen separately, so the core never sees
//! the I/O side.

use std::io::Read;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::domain::HierarchyRecord;
use crate::infrastructure::{InfraError, InfraResult};

/// Supplies the raw record value for one render cycle.
pub trait RecordSource {
    /// Human readable origin, used in messages.
    fn describe(&self) -> String;

    /// Load the raw value; `None` when the source is empty.
    fn load(&self) -> InfraResult<Option<Value>>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> InfraResult<Option<Value>> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| InfraError::io(format!("read {}", self.path.display()), e))?;
        parse_json(&content, &self.describe())
    }
}

/// JSON read from standard input.
#[derive(Debug, Clone, Default)]
pub struct StdinSource;

impl RecordSource for StdinSource {
    fn describe(&self) -> String {
        "<stdin>".to_string()
    }

    fn load(&self) -> InfraResult<Option<Value>> {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| InfraError::io("read stdin", e))?;
        parse_json(&content, &self.describe())
    }
}

/// Built-in sample hierarchy.
#[derive(Debug, Clone, Default)]
pub struct DemoSource;

impl RecordSource for DemoSource {
    fn describe(&self) -> String {
        "<demo>".to_string()
    }

    fn load(&self) -> InfraResult<Option<Value>> {
        let value = serde_json::to_value(demo_records())
            .map_err(|e| InfraError::json("encode demo records", e))?;
        Ok(Some(value))
    }
}

/// Sample organization: one head with two reports, one of whom has a report.
pub fn demo_records() -> Vec<HierarchyRecord> {
    vec![
        HierarchyRecord::new(1, None, [2, 3]),
        HierarchyRecord::new(2, Some(1), [4]),
        HierarchyRecord::new(3, Some(1), []),
        HierarchyRecord::new(4, Some(2), []),
    ]
}

/// Blank content is an empty source, not a decode error.
pub fn parse_json(content: &str, origin: &str) -> InfraResult<Option<Value>> {
    if content.trim().is_empty() {
        debug!(origin, "source is empty");
        return Ok(None);
    }
    serde_json::from_str(content)
        .map(Some)
        .map_err(|e| InfraError::json(format!("parse {}", origin), e))
}

/// Take the record list out of an enclosing object such as `{"data": [...]}`.
///
/// Non-object values pass through unchanged, and so does an object without
/// `field` (the builder then reports it as malformed). An empty `field`
/// disables unwrapping.
pub fn unwrap_field(value: Option<Value>, field: &str) -> Option<Value> {
    if field.is_empty() {
        return value;
    }
    match value {
        Some(Value::Object(mut map)) => match map.remove(field) {
            Some(inner) => Some(inner),
            None => {
                warn!(field, "wrapper object has no such field, passing it on");
                Some(Value::Object(map))
            }
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_wrapped_array_when_unwrapping_then_returns_inner_value() {
        let value = json!({"data": [{"id": 1}], "status": "ok"});
        assert_eq!(unwrap_field(Some(value), "data"), Some(json!([{"id": 1}])));
    }

    #[test]
    fn given_bare_array_when_unwrapping_then_passes_through() {
        let value = json!([{"id": 1}]);
        assert_eq!(unwrap_field(Some(value.clone()), "data"), Some(value));
    }

    #[test]
    fn given_object_without_field_when_unwrapping_then_passes_object_on() {
        let value = json!({"items": []});
        assert_eq!(unwrap_field(Some(value.clone()), "data"), Some(value));
    }

    #[test]
    fn given_empty_field_when_unwrapping_then_keeps_object() {
        let value = json!({"data": []});
        assert_eq!(unwrap_field(Some(value.clone()), ""), Some(value));
    }

    #[test]
    fn given_blank_content_when_parsing_then_returns_none() {
        assert!(parse_json("  \n", "test").unwrap().is_none());
        assert!(parse_json("[1,", "test").is_err());
    }

    #[test]
    fn given_demo_source_when_loading_then_returns_four_records() {
        let value = DemoSource.load().unwrap().unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(4));
    }
}
