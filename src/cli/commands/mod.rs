//! CLI command implementations

pub mod cache;
pub mod config;
pub mod matches;
pub mod run;

pub use cache::execute as cache;
pub use config::execute as config;
pub use matches::execute as matches;
pub use run::execute as run;
