//! Bounded deduplication cache for seen postings
//!
//! Each watched source owns one [`DedupCache`]. The cache is a fixed-capacity
//! set paired with a circular buffer recording insertion order; once the
//! buffer is full, every accepted identifier evicts the one occupying the
//! slot it is written to.
//!
//! # Slot arithmetic
//!
//! | inserted | slot | buffer (capacity 3) | evicted |
//! |----------|------|---------------------|---------|
//! | a        | 0    | `[a]`               | -       |
//! | b        | 1    | `[a, b]`            | -       |
//! | c        | 2    | `[a, b, c]`         | -       |
//! | d        | 0    | `[d, b, c]`         | a       |
//! | e        | 1    | `[d, e, c]`         | b       |

pub mod cache;
pub mod identifier;
pub mod state;

pub use cache::DedupCache;
pub use identifier::normalize_identifier;
pub use state::CacheState;
