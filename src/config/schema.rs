//! Configuration schema for freewatch
//!
//! Configuration is stored at `~/.config/freewatch/config.toml`

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Dedup cache settings
    pub cache: CacheConfig,

    /// Poll loop settings
    pub poll: PollConfig,

    /// Listing extraction settings
    pub extract: ExtractConfig,

    /// Keywords that make a listing interesting
    pub keywords: KeywordsConfig,

    /// Watched listing pages
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            poll: PollConfig::default(),
            extract: ExtractConfig::default(),
            keywords: KeywordsConfig::default(),
            sources: default_sources(),
        }
    }
}

impl Config {
    /// Check values serde cannot express, returning a human-readable reason
    pub fn validate(&self) -> Result<(), String> {
        if self.cache.capacity == 0 {
            return Err("cache.capacity must be positive".to_string());
        }

        if self.poll.min_interval_secs > self.poll.max_interval_secs {
            return Err(format!(
                "poll.min_interval_secs ({}) exceeds poll.max_interval_secs ({})",
                self.poll.min_interval_secs, self.poll.max_interval_secs
            ));
        }

        let mut names = HashSet::new();
        let mut stems: HashMap<String, &str> = HashMap::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err("sources entry with empty name".to_string());
            }
            if !names.insert(source.name.as_str()) {
                return Err(format!("duplicate source name: {}", source.name));
            }
            // Each source owns one cache file
            let stem = crate::store::file_stem(&source.name);
            if let Some(other) = stems.insert(stem.clone(), &source.name) {
                return Err(format!(
                    "sources {} and {} would share cache file {}.json",
                    other, source.name, stem
                ));
            }
            if let Err(e) = url::Url::parse(&source.url) {
                return Err(format!("source {} has invalid url: {}", source.name, e));
            }
        }

        Ok(())
    }

    /// Cache capacity as a non-zero value
    pub fn cache_capacity(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.cache.capacity)
    }

    /// Directory holding persisted caches and the notification log
    pub fn state_dir(&self) -> PathBuf {
        self.general
            .state_dir
            .clone()
            .unwrap_or_else(super::ConfigManager::default_state_dir)
    }

    /// Look up a source by name
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Append notifications to the notification log
    pub notification_log: bool,

    /// Override for the state directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            notification_log: true,
            state_dir: None,
        }
    }
}

/// Dedup cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Identifiers remembered per source
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 250 }
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Lower bound of the sleep between cycles
    pub min_interval_secs: u64,

    /// Upper bound of the sleep between cycles
    pub max_interval_secs: u64,

    /// HTTP request timeout
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl PollConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: 120,
            max_interval_secs: 240,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/61.0.3163.100 Safari/537.36"
                .to_string(),
        }
    }
}

/// CSS selectors locating listings on a page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Selector for one listing row
    pub item_selector: String,

    /// Selector, relative to a row, for the title link
    pub title_selector: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            item_selector: "ul.rows li".to_string(),
            title_selector: "p.result-info a.result-title".to_string(),
        }
    }
}

/// Keyword configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordsConfig {
    /// Substrings matched case-insensitively against titles
    pub words: Vec<String>,
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        let words = [
            "tv",
            "television",
            "computer",
            "electronic",
            "calculator",
            "vintage",
            "electric",
            "chinchilla",
            "router",
            "modem",
            "printer",
            "scanner",
            "copier",
            "sound",
        ];
        Self {
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// A watched listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Name used in logs, notifications and cache file names
    pub name: String,

    /// Listing page URL
    pub url: String,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Sources watched when the config file defines none
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(
            "Denver",
            "https://denver.craigslist.org/d/free-stuff/search/zip",
        ),
        SourceConfig::new(
            "Boulder",
            "https://boulder.craigslist.org/d/free-stuff/search/zip",
        ),
    ]
}
