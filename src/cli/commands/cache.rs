//! Cache command - inspect and clear persisted dedup caches

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::dedup::{CacheState, DedupCache};
use crate::error::{FreewatchError, FreewatchResult};
use crate::store::CacheStore;
use crate::ui::{self, UiContext};
use console::style;
use std::num::NonZeroUsize;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> FreewatchResult<()> {
    let store = CacheStore::new(&config.state_dir());

    match args.action {
        CacheAction::List { format } => list_caches(&store, format).await,
        CacheAction::Show { source, limit } => show_cache(&store, &source, limit).await,
        CacheAction::Clear { source, yes } => clear_caches(&store, source, yes).await,
    }
}

async fn list_caches(store: &CacheStore, format: OutputFormat) -> FreewatchResult<()> {
    let states = store.list().await?;

    if states.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!("No persisted caches."),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_cache_table(&states),
        OutputFormat::Json => print_cache_json(&states)?,
        OutputFormat::Plain => {
            for state in &states {
                println!("{}", state.service);
            }
        }
    }

    Ok(())
}

fn print_cache_table(states: &[CacheState]) {
    println!(
        "{:<24} {:<10} {:<10} {:<12}",
        style("SOURCE").bold(),
        style("ENTRIES").bold(),
        style("CAPACITY").bold(),
        style("INSERTED").bold()
    );
    println!("{}", "-".repeat(58));

    for state in states {
        println!(
            "{:<24} {:<10} {:<10} {:<12}",
            state.service,
            state.seen.len(),
            state.max,
            state.count
        );
    }

    println!();
    println!("Total: {} cache(s)", states.len());
}

fn print_cache_json(states: &[CacheState]) -> FreewatchResult<()> {
    #[derive(serde::Serialize)]
    struct CacheJson<'a> {
        service: &'a str,
        entries: usize,
        capacity: usize,
        inserted: u64,
    }

    let summaries: Vec<CacheJson<'_>> = states
        .iter()
        .map(|s| CacheJson {
            service: &s.service,
            entries: s.seen.len(),
            capacity: s.max,
            inserted: s.count,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

async fn show_cache(store: &CacheStore, source: &str, limit: usize) -> FreewatchResult<()> {
    let state = store
        .read_state(source)
        .await?
        .ok_or_else(|| FreewatchError::SourceNotFound(source.to_string()))?;

    let capacity = NonZeroUsize::new(state.max)
        .ok_or_else(|| FreewatchError::invalid_state(source, "capacity is zero"))?;
    let next_slot = state.next_slot().unwrap_or(0);
    let cache = DedupCache::from_state(capacity, state)?;

    let ctx = UiContext::detect();
    ui::intro(&ctx, &format!("{} cache", source));
    ui::key_value(&ctx, "entries", &cache.len().to_string());
    ui::key_value(&ctx, "capacity", &cache.capacity().to_string());
    ui::key_value(&ctx, "inserted", &cache.inserted_count().to_string());
    ui::key_value(&ctx, "next slot", &next_slot.to_string());
    println!();

    let shown = if limit == 0 { cache.len() } else { limit };
    for id in cache.iter_recent().take(shown) {
        println!("  {}", id);
    }
    if shown < cache.len() {
        ui::remark(&ctx, &format!("... {} more", cache.len() - shown));
    }

    Ok(())
}

async fn clear_caches(store: &CacheStore, source: Option<String>, yes: bool) -> FreewatchResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);

    let targets: Vec<String> = match source {
        Some(name) => vec![name],
        None => store.list().await?.into_iter().map(|s| s.service).collect(),
    };

    if targets.is_empty() {
        ui::step_info(&ctx, "No persisted caches to clear");
        return Ok(());
    }

    let prompt = format!(
        "Clear {} cache(s)? Previously reported postings will be reported again",
        targets.len()
    );
    if !ui::confirm(&ctx, &prompt, false).await? {
        ui::step_warn_hint(&ctx, "Nothing cleared", "Pass --yes to skip confirmation");
        return Ok(());
    }

    for name in &targets {
        if store.remove(name).await? {
            ui::step_ok(&ctx, &format!("Cleared {}", name));
        } else {
            ui::step_warn_hint(
                &ctx,
                &format!("No cache for {}", name),
                "Run: freewatch cache list",
            );
        }
    }

    Ok(())
}
