//! Run command - poll sources until interrupted

use crate::cli::args::RunArgs;
use crate::config::{Config, ConfigManager, SourceConfig};
use crate::error::{FreewatchError, FreewatchResult};
use crate::matcher::KeywordMatcher;
use crate::poll::{
    HttpFetcher, IntervalPolicy, NotificationLog, PollDriver, Scheduler, SelectorExtractor,
    TokioSleeper,
};
use crate::store::CacheStore;
use crate::ui::{self, UiContext};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Execute the run command
pub async fn execute(args: RunArgs, config: &Config) -> FreewatchResult<()> {
    let capacity = config
        .cache_capacity()
        .ok_or_else(|| FreewatchError::User("cache.capacity must be positive".to_string()))?;
    let sources = select_sources(config, &args.source)?;
    if sources.is_empty() {
        return Err(FreewatchError::User(
            "No sources configured. Add [[sources]] to the config file".to_string(),
        ));
    }

    let state_dir = config.state_dir();
    ConfigManager::ensure_state_dirs(&state_dir).await?;
    let store = CacheStore::new(&state_dir);

    let matcher = KeywordMatcher::new(&config.keywords.words);
    if matcher.is_empty() {
        warn!("No keywords configured; no listing will match");
    }

    let fetcher = Arc::new(HttpFetcher::new(
        &config.poll.user_agent,
        config.poll.timeout(),
    ));
    let extractor = Arc::new(SelectorExtractor::new(
        &config.extract.item_selector,
        &config.extract.title_selector,
    ));
    let notifier = Arc::new(NotificationLog::new(
        ConfigManager::notification_log_path(&state_dir),
        config.general.notification_log,
    ));

    let mut driver = PollDriver::new(sources, capacity, matcher, fetcher, extractor, notifier);
    let restored = driver.restore_caches(&store).await;
    info!(
        "Watching {} source(s), {} cache(s) restored from {}",
        driver.sources().len(),
        restored,
        store.dir().display()
    );

    let policy =
        IntervalPolicy::from_secs(config.poll.min_interval_secs, config.poll.max_interval_secs)?;
    let mut scheduler = Scheduler::new(policy, TokioSleeper).with_max_cycles(args.max_cycles());

    let summary = scheduler
        .run(&mut driver, &store, shutdown_signal())
        .await?;

    let ctx = UiContext::detect();
    ui::step_ok_detail(
        &ctx,
        &format!("Finished after {} cycle(s)", summary.cycles),
        &format!("{} new posting(s)", summary.accepted),
    );

    Ok(())
}

/// Resolve `--source` filters against the configured sources
fn select_sources(config: &Config, names: &[String]) -> FreewatchResult<Vec<SourceConfig>> {
    if names.is_empty() {
        return Ok(config.sources.clone());
    }

    names
        .iter()
        .map(|name| {
            config
                .source(name)
                .cloned()
                .ok_or_else(|| FreewatchError::SourceNotFound(name.clone()))
        })
        .collect()
}

/// Resolves on Ctrl-C
///
/// The listener is spawned immediately so a signal arriving mid-cycle is
/// remembered until the scheduler next checks.
fn shutdown_signal() -> impl Future<Output = ()> {
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => {
                warn!("Cannot listen for Ctrl-C: {}", e);
                let _keep_open = tx;
                std::future::pending::<()>().await;
            }
        }
    });

    async move {
        let _ = rx.await;
    }
}
