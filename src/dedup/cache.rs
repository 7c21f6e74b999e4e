//! Fixed-capacity dedup cache with ring-buffer eviction

use crate::dedup::state::CacheState;
use crate::error::{FreewatchError, FreewatchResult};
use std::collections::HashSet;
use std::num::NonZeroUsize;

/// Insertion-ordered set of identifiers with a fixed capacity
///
/// `members` answers membership queries; `insertion_order` is the circular
/// buffer deciding which identifier goes when a slot is reused. Both always
/// hold exactly the same identifiers.
#[derive(Debug, Clone)]
pub struct DedupCache {
    capacity: NonZeroUsize,
    inserted_count: u64,
    members: HashSet<String>,
    insertion_order: Vec<String>,
}

impl DedupCache {
    /// Create an empty cache
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            inserted_count: 0,
            members: HashSet::with_capacity(capacity.get()),
            insertion_order: Vec::with_capacity(capacity.get()),
        }
    }

    /// Restore a cache from persisted state
    ///
    /// Fields are taken verbatim. Inconsistent state is rejected with
    /// `InvalidState` rather than repaired; the caller decides whether to
    /// fall back to an empty cache.
    pub fn from_state(capacity: NonZeroUsize, state: CacheState) -> FreewatchResult<Self> {
        let invalid = |reason: String| FreewatchError::invalid_state(&state.service, reason);

        if state.max != capacity.get() {
            return Err(invalid(format!(
                "capacity mismatch: state has {}, expected {}",
                state.max, capacity
            )));
        }

        if state.seen.len() > state.max {
            return Err(invalid(format!(
                "seen holds {} entries but capacity is {}",
                state.seen.len(),
                state.max
            )));
        }

        if state.count == u64::MAX {
            return Err(invalid("count is exhausted".to_string()));
        }

        let expected_len = state.count.min(state.max as u64);
        if state.seen.len() as u64 != expected_len {
            return Err(invalid(format!(
                "seen holds {} entries but count {} implies {}",
                state.seen.len(),
                state.count,
                expected_len
            )));
        }

        if state.cache_set.len() != state.seen.len() {
            return Err(invalid(format!(
                "cache_set holds {} entries but seen holds {}",
                state.cache_set.len(),
                state.seen.len()
            )));
        }

        let members: HashSet<String> = state.cache_set.iter().cloned().collect();
        if members.len() != state.cache_set.len() {
            return Err(invalid("cache_set contains duplicates".to_string()));
        }

        {
            let mut order_check = HashSet::with_capacity(state.seen.len());
            for id in &state.seen {
                if id.trim().is_empty() {
                    return Err(invalid("seen contains an empty identifier".to_string()));
                }
                if !order_check.insert(id.as_str()) {
                    return Err(invalid(format!("seen contains duplicate {:?}", id)));
                }
                if !members.contains(id) {
                    return Err(invalid(format!("{:?} is in seen but not in cache_set", id)));
                }
            }
        }

        Ok(Self {
            capacity,
            inserted_count: state.count,
            members,
            insertion_order: state.seen,
        })
    }

    /// Insert an identifier unless it is already present
    ///
    /// Returns `Ok(true)` when accepted and `Ok(false)` for a duplicate, in
    /// which case nothing changes.
    pub fn try_insert(&mut self, identifier: &str) -> FreewatchResult<bool> {
        if identifier.trim().is_empty() {
            return Err(FreewatchError::InvalidIdentifier);
        }

        if self.members.contains(identifier) {
            return Ok(false);
        }

        let next_count = self
            .inserted_count
            .checked_add(1)
            .ok_or_else(|| FreewatchError::Internal("insertion count overflow".to_string()))?;
        let slot = self.next_slot();
        let entry = identifier.to_string();

        // A slot is occupied exactly when the buffer has filled
        // (inserted_count >= capacity); its occupant is evicted.
        match self.insertion_order.get_mut(slot) {
            Some(occupant) => {
                let evicted = std::mem::replace(occupant, entry.clone());
                self.members.remove(&evicted);
            }
            None => self.insertion_order.push(entry.clone()),
        }

        self.members.insert(entry);
        self.inserted_count = next_count;
        Ok(true)
    }

    /// Check whether an identifier is present
    pub fn contains(&self, identifier: &str) -> bool {
        self.members.contains(identifier)
    }

    /// Snapshot the cache for persistence
    pub fn to_state(&self, service: &str) -> CacheState {
        let mut cache_set: Vec<String> = self.members.iter().cloned().collect();
        cache_set.sort_unstable();

        CacheState {
            service: service.to_string(),
            max: self.capacity.get(),
            count: self.inserted_count,
            cache_set,
            seen: self.insertion_order.clone(),
        }
    }

    /// Number of identifiers currently present
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Total successful insertions, not clamped to capacity
    pub fn inserted_count(&self) -> u64 {
        self.inserted_count
    }

    /// Present identifiers, most recently inserted first
    pub fn iter_recent(&self) -> impl Iterator<Item = &str> + '_ {
        let len = self.insertion_order.len();
        let newest = if len == 0 {
            0
        } else {
            ((self.inserted_count - 1) % self.capacity.get() as u64) as usize
        };

        (0..len).map(move |i| self.insertion_order[(newest + len - i) % len].as_str())
    }

    fn next_slot(&self) -> usize {
        (self.inserted_count % self.capacity.get() as u64) as usize
    }
}
