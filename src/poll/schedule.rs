//! Poll cycle scheduling
//!
//! Runs driver cycles back to back with a jittered sleep in between.
//! Shutdown is only honoured while sleeping, so a cycle always completes
//! and its caches are persisted before the loop exits.

use crate::error::{FreewatchError, FreewatchResult};
use crate::poll::driver::PollDriver;
use crate::store::CacheStore;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Suspends the scheduler between cycles
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Uniform random sleep interval in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalPolicy {
    min_secs: u64,
    max_secs: u64,
}

impl IntervalPolicy {
    pub fn from_secs(min_secs: u64, max_secs: u64) -> FreewatchResult<Self> {
        if min_secs > max_secs {
            return Err(FreewatchError::User(format!(
                "Invalid poll interval: minimum {}s exceeds maximum {}s",
                min_secs, max_secs
            )));
        }
        Ok(Self { min_secs, max_secs })
    }

    /// Draw the next sleep interval
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_secs(rng.gen_range(self.min_secs..=self.max_secs))
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub accepted: usize,
}

/// Repeats poll cycles until a cycle limit or shutdown
pub struct Scheduler<S: Sleeper> {
    policy: IntervalPolicy,
    sleeper: S,
    rng: StdRng,
    max_cycles: Option<u64>,
}

impl<S: Sleeper> Scheduler<S> {
    pub fn new(policy: IntervalPolicy, sleeper: S) -> Self {
        Self {
            policy,
            sleeper,
            rng: StdRng::from_entropy(),
            max_cycles: None,
        }
    }

    /// Use a fixed RNG, making interval draws reproducible
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Stop after `max_cycles` cycles (`None` runs until shutdown)
    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Run cycles, persisting caches after each one and on exit
    pub async fn run<F>(
        &mut self,
        driver: &mut PollDriver,
        store: &CacheStore,
        shutdown: F,
    ) -> FreewatchResult<RunSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        loop {
            let report = driver.run_cycle().await;
            summary.cycles += 1;
            summary.accepted += report.accepted();

            if let Err(e) = driver.persist_caches(store).await {
                warn!("Failed to persist caches after cycle {}: {}", summary.cycles, e);
            }

            if self.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }

            let interval = self.policy.sample(&mut self.rng);
            info!("Sleeping for {} seconds", interval.as_secs());

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested after cycle {}", summary.cycles);
                    break;
                }
                _ = self.sleeper.sleep(interval) => {}
            }
        }

        driver.persist_caches(store).await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use crate::matcher::KeywordMatcher;
    use crate::poll::extract::{Extractor, Listing};
    use crate::poll::fetch::Fetcher;
    use crate::poll::notify::{Notifier, Posting};
    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for Arc<RecordingSleeper> {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    /// Returns a page with one new posting per call
    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> FreewatchResult<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("tv {n}|https://example.org/zip/{n}.html"))
        }
    }

    struct LineExtractor;

    impl Extractor for LineExtractor {
        fn extract(&self, html: &str) -> Vec<Listing> {
            html.lines()
                .filter_map(|line| line.split_once('|'))
                .map(|(title, href)| Listing::new(title, href))
                .collect()
        }
    }

    struct NullNotifier;

    #[async_trait]
    impl Notifier for NullNotifier {
        async fn notify(&self, _source: &str, _postings: &[Posting]) -> FreewatchResult<()> {
            Ok(())
        }
    }

    fn driver() -> PollDriver {
        PollDriver::new(
            vec![SourceConfig::new("Denver", "https://example.org/search/zip")],
            NonZeroUsize::new(10).unwrap(),
            KeywordMatcher::new(["tv"]),
            Arc::new(CountingFetcher::default()),
            Arc::new(LineExtractor),
            Arc::new(NullNotifier),
        )
    }

    #[test]
    fn interval_within_bounds() {
        let policy = IntervalPolicy::from_secs(120, 240).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let secs = policy.sample(&mut rng).as_secs();
            assert!((120..=240).contains(&secs));
        }
    }

    #[test]
    fn fixed_interval() {
        let policy = IntervalPolicy::from_secs(5, 5).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(policy.sample(&mut rng), Duration::from_secs(5));
    }

    #[test]
    fn rejects_inverted_interval() {
        assert!(IntervalPolicy::from_secs(10, 1).is_err());
    }

    #[tokio::test]
    async fn runs_bounded_cycles_and_sleeps_between() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path());
        let sleeper = Arc::new(RecordingSleeper::default());
        let mut driver = driver();

        let mut scheduler = Scheduler::new(
            IntervalPolicy::from_secs(120, 240).unwrap(),
            sleeper.clone(),
        )
        .with_rng(StdRng::seed_from_u64(42))
        .with_max_cycles(Some(3));

        let summary = scheduler
            .run(&mut driver, &store, std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary, RunSummary { cycles: 3, accepted: 3 });

        let slept = sleeper.slept.lock().unwrap().clone();
        assert_eq!(slept.len(), 2);
        assert!(slept
            .iter()
            .all(|d| (120..=240).contains(&d.as_secs())));

        let persisted = store.load("Denver", NonZeroUsize::new(10).unwrap()).await.unwrap();
        assert_eq!(persisted.unwrap().inserted_count(), 3);
    }

    #[tokio::test]
    async fn shutdown_stops_between_cycles() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path());
        let sleeper = Arc::new(RecordingSleeper::default());
        let mut driver = driver();

        let mut scheduler = Scheduler::new(IntervalPolicy::from_secs(1, 2).unwrap(), sleeper.clone());

        let summary = scheduler
            .run(&mut driver, &store, async {})
            .await
            .unwrap();

        assert_eq!(summary.cycles, 1);
        assert!(sleeper.slept.lock().unwrap().is_empty());
        assert!(store.file_path("Denver").exists());
    }
}
