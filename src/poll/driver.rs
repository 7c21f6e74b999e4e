//! Poll driver: fetch, extract, match, dedup, notify
//!
//! The driver owns one [`DedupCache`] per source, keyed by source name.
//! Sources are polled one after another and candidates are fed to the
//! cache in page order, so no cache is ever touched concurrently.

use crate::config::SourceConfig;
use crate::dedup::{normalize_identifier, DedupCache};
use crate::error::{FreewatchError, FreewatchResult};
use crate::matcher::{normalize_title, KeywordMatcher};
use crate::poll::extract::{Extractor, Listing};
use crate::poll::fetch::Fetcher;
use crate::poll::notify::{Notifier, Posting};
use crate::store::CacheStore;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of polling one source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    /// Candidates extracted from the page
    pub listings: usize,
    /// Candidates whose title matched a keyword
    pub matched: usize,
    /// Matched candidates the cache had not seen
    pub accepted: usize,
    /// Cache insertion count after the poll
    pub cache_count: u64,
    /// Set when the fetch or notification failed
    pub error: Option<String>,
}

/// Outcome of one pass over every source
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub sources: Vec<SourceReport>,
}

impl CycleReport {
    /// Total new postings across sources
    pub fn accepted(&self) -> usize {
        self.sources.iter().map(|s| s.accepted).sum()
    }

    pub fn failed(&self) -> usize {
        self.sources.iter().filter(|s| s.error.is_some()).count()
    }
}

/// Drives poll cycles over a fixed set of sources
pub struct PollDriver {
    sources: Vec<SourceConfig>,
    capacity: NonZeroUsize,
    caches: BTreeMap<String, DedupCache>,
    matcher: KeywordMatcher,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    notifier: Arc<dyn Notifier>,
}

impl PollDriver {
    /// Create a driver with an empty cache for every source
    pub fn new(
        sources: Vec<SourceConfig>,
        capacity: NonZeroUsize,
        matcher: KeywordMatcher,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let caches = sources
            .iter()
            .map(|s| (s.name.clone(), DedupCache::new(capacity)))
            .collect();

        Self {
            sources,
            capacity,
            caches,
            matcher,
            fetcher,
            extractor,
            notifier,
        }
    }

    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    /// Get the cache owned by a source
    pub fn cache(&self, source: &str) -> Option<&DedupCache> {
        self.caches.get(source)
    }

    /// Replace fresh caches with persisted ones where available
    ///
    /// A source whose persisted state cannot be restored keeps its empty
    /// cache; the failure is logged. Returns the number of restored caches.
    pub async fn restore_caches(&mut self, store: &CacheStore) -> usize {
        let mut restored = 0;

        for source in &self.sources {
            match store.load(&source.name, self.capacity).await {
                Ok(Some(cache)) => {
                    info!(
                        "Restored {} cache ({} entries, count {})",
                        source.name,
                        cache.len(),
                        cache.inserted_count()
                    );
                    self.caches.insert(source.name.clone(), cache);
                    restored += 1;
                }
                Ok(None) => debug!("No persisted cache for {}", source.name),
                Err(e @ FreewatchError::InvalidState { .. }) => {
                    warn!("{}; starting {} with an empty cache", e, source.name);
                }
                Err(e) => {
                    warn!("Could not load {} cache: {}; starting empty", source.name, e);
                }
            }
        }

        restored
    }

    /// Persist every cache
    pub async fn persist_caches(&self, store: &CacheStore) -> FreewatchResult<()> {
        for (source, cache) in &self.caches {
            store.save(source, cache).await?;
        }
        Ok(())
    }

    /// Poll every source once
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        for source in self.sources.clone() {
            let source_report = match self.poll_source(&source).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Polling {} failed: {}", source.name, e);
                    SourceReport {
                        source: source.name.clone(),
                        cache_count: self.cache_count(&source.name),
                        error: Some(e.to_string()),
                        ..SourceReport::default()
                    }
                }
            };
            report.sources.push(source_report);
        }

        report
    }

    async fn poll_source(&mut self, source: &SourceConfig) -> FreewatchResult<SourceReport> {
        info!("Requesting from {}..", source.name);
        let html = self.fetcher.fetch(&source.url).await?;

        debug!("Parsing {} bytes from {}", html.len(), source.name);
        let listings = self.extractor.extract(&html);

        let mut report = SourceReport {
            source: source.name.clone(),
            listings: listings.len(),
            ..SourceReport::default()
        };

        if listings.is_empty() {
            debug!("No listings found for {}", source.name);
            report.cache_count = self.cache_count(&source.name);
            return Ok(report);
        }

        let (matched, postings) = self.process_listings(source, &listings);
        report.matched = matched;
        report.accepted = postings.len();
        report.cache_count = self.cache_count(&source.name);

        info!("{} cache count is now {}", source.name, report.cache_count);

        if !postings.is_empty() {
            info!(
                "Sending notifications for {} interesting items in {}",
                postings.len(),
                source.name
            );
            if let Err(e) = self.notifier.notify(&source.name, &postings).await {
                warn!("Notification for {} failed: {}", source.name, e);
                report.error = Some(e.to_string());
            }
        }

        Ok(report)
    }

    /// Feed extracted listings through the matcher and the source's cache
    ///
    /// Returns the number of keyword matches and the accepted postings.
    /// Accepted postings sharing a normalized title collapse into one entry
    /// carrying the latest identifier.
    pub fn process_listings(
        &mut self,
        source: &SourceConfig,
        listings: &[Listing],
    ) -> (usize, Vec<Posting>) {
        let base = Url::parse(&source.url).ok();
        let capacity = self.capacity;
        let cache = self
            .caches
            .entry(source.name.clone())
            .or_insert_with(|| DedupCache::new(capacity));

        let mut matched = 0;
        let mut accepted: Vec<Posting> = vec![];

        for listing in listings {
            if !self.matcher.matches(&listing.title) {
                continue;
            }
            matched += 1;

            let identifier = normalize_identifier(&resolve_href(base.as_ref(), &listing.href));
            match cache.try_insert(&identifier) {
                Ok(true) => {
                    debug!("Added {:?} to cache", identifier);
                    let title = normalize_title(&listing.title);
                    match accepted.iter_mut().find(|p| p.title == title) {
                        Some(existing) => existing.url = identifier,
                        None => accepted.push(Posting {
                            title,
                            url: identifier,
                        }),
                    }
                }
                Ok(false) => debug!("Already in cache {:?}", identifier),
                Err(e) => warn!("Skipping listing {:?}: {}", listing.title, e),
            }
        }

        (matched, accepted)
    }

    fn cache_count(&self, source: &str) -> u64 {
        self.caches
            .get(source)
            .map(DedupCache::inserted_count)
            .unwrap_or(0)
    }
}

/// Resolve a possibly relative link against the page it was found on
fn resolve_href(base: Option<&Url>, href: &str) -> String {
    match base.map(|b| b.join(href)) {
        Some(Ok(url)) => url.to_string(),
        _ => href.to_string(),
    }
}
