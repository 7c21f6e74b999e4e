//! freewatch - classified listings watcher
//!
//! Polls listing pages, keeps a bounded per-source memory of postings
//! already reported, and records new keyword matches.

pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod matcher;
pub mod poll;
pub mod store;
pub mod ui;

pub use error::{FreewatchError, FreewatchResult};
