//! Polling listing pages
//!
//! The collaborators the driver talks to are traits so that cycles can be
//! exercised without a network:
//!
//! | Trait       | Production impl     | Role                               |
//! |-------------|---------------------|------------------------------------|
//! | `Fetcher`   | `HttpFetcher`       | GET the listing page               |
//! | `Extractor` | `SelectorExtractor` | Pull (title, href) rows out of it  |
//! | `Notifier`  | `NotificationLog`   | Record postings the cache accepted |
//! | `Sleeper`   | `TokioSleeper`      | Wait between cycles                |

pub mod driver;
pub mod extract;
pub mod fetch;
pub mod notify;
pub mod schedule;

pub use driver::{CycleReport, PollDriver, SourceReport};
pub use extract::{Extractor, Listing, SelectorExtractor};
pub use fetch::{Fetcher, HttpFetcher};
pub use notify::{NotificationLog, Notifier, Posting};
pub use schedule::{IntervalPolicy, RunSummary, Scheduler, Sleeper, TokioSleeper};
