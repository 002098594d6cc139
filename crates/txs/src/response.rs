//! Structured handler responses.

use serde::{Deserialize, Serialize};

/// Key/value tag attached to a response, used for external indexing and
/// auditing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KvPair {
    pub key: String,
    pub value: String,
}

impl KvPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Outcome of a handler invocation.
///
/// Every response carries a human-readable log and a `tx.type` tag; the
/// pipeline surfaces both to external indexers.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub log: String,
    pub info: String,
    pub gas_wanted: u64,
    pub gas_used: u64,
    pub tags: Vec<KvPair>,
}

impl Response {
    pub fn with_log(log: impl Into<String>) -> Self {
        Self {
            log: log.into(),
            ..Default::default()
        }
    }

    pub fn tagged(mut self, tags: Vec<KvPair>) -> Self {
        self.tags = tags;
        self
    }

    /// Whether a tag with the given key is present.
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.iter().any(|t| t.key == key)
    }
}
