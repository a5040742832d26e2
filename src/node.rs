//! Node identifiers shared by edge tables, graphs and adjacency mappings.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a node in the evaluated graph.
///
/// Serialized transparently, so `{"u": 42}` in JSON input maps straight to
/// `NodeId(42)`, and adjacency keys round-trip as JSON object keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a `NodeId` from a raw `u64`.
    pub const fn new(raw: u64) -> Self {
        NodeId(raw)
    }

    /// Get the underlying `u64` value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        NodeId(raw)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
