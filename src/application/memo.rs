//! Forest memoization keyed on input content
//!
//! The record value is fingerprinted with SHA-256 over its JSON encoding.
//! The forest is rebuilt only when the fingerprint changes.

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::domain::{Forest, ForestBuilder};

/// Marker hashed for absent input, distinct from any JSON encoding.
const ABSENT: &[u8] = b"\0absent";

/// Compute the hex SHA-256 fingerprint of an input value.
pub fn fingerprint(value: Option<&Value>) -> String {
    let mut hasher = Sha256::new();
    match value {
        Some(v) => hasher.update(v.to_string().as_bytes()),
        None => hasher.update(ABSENT),
    }
    hex::encode(hasher.finalize())
}

/// Last built forest together with the fingerprint of its input.
#[derive(Debug, Default)]
pub struct ForestMemo {
    fingerprint: Option<String>,
    forest: Forest,
    builds: usize,
}

impl ForestMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the forest if `value` differs from the last input.
    ///
    /// Returns true when a rebuild happened.
    pub fn refresh(&mut self, value: Option<&Value>) -> bool {
        let fingerprint = fingerprint(value);
        if self.fingerprint.as_deref() == Some(fingerprint.as_str()) {
            trace!(%fingerprint, "input unchanged, reusing forest");
            return false;
        }
        self.forest = ForestBuilder::build_from_value(value);
        self.builds += 1;
        debug!(%fingerprint, builds = self.builds, "forest rebuilt");
        self.fingerprint = Some(fingerprint);
        true
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// How many times the forest has been built.
    pub fn builds(&self) -> usize {
        self.builds
    }
}
