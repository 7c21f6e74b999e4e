//! Persisted cache state

use serde::{Deserialize, Serialize};

/// Serialized form of a [`DedupCache`](super::DedupCache)
///
/// Field names match the on-disk JSON layout. `cache_set` order carries no
/// meaning; `seen` is the circular buffer and its order must be preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheState {
    /// Source this cache belongs to
    pub service: String,

    /// Cache capacity
    pub max: usize,

    /// Total successful insertions over the cache's lifetime
    pub count: u64,

    /// Identifiers currently present
    pub cache_set: Vec<String>,

    /// Circular insertion buffer, indexed by `count % max`
    pub seen: Vec<String>,
}

impl CacheState {
    /// Slot the next insertion will write to
    pub fn next_slot(&self) -> Option<usize> {
        if self.max == 0 {
            return None;
        }
        Some((self.count % self.max as u64) as usize)
    }
}
