//! Notification delivery for newly seen postings
//!
//! `NotificationLog` appends one JSON line per posting to
//! `<state_dir>/notifications.log`; anything tailing that file (a mailer,
//! a chat bot) owns the actual transport.

use crate::error::{FreewatchError, FreewatchResult};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// A posting accepted by a source's dedup cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Posting {
    /// Normalized title
    pub title: String,

    /// Cache identifier (scheme-stripped URL)
    pub url: String,
}

/// Receives the new postings of one source after each poll
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, source: &str, postings: &[Posting]) -> FreewatchResult<()>;
}

/// File-based notifier that appends JSON lines
pub struct NotificationLog {
    enabled: bool,
    path: PathBuf,
}

impl NotificationLog {
    pub fn new(path: PathBuf, enabled: bool) -> Self {
        Self { enabled, path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn append(&self, lines: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(lines.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for NotificationLog {
    async fn notify(&self, source: &str, postings: &[Posting]) -> FreewatchResult<()> {
        for posting in postings {
            info!("{}: {} : {}", source, posting.title, posting.url);
        }

        if !self.enabled || postings.is_empty() {
            return Ok(());
        }

        let timestamp = Utc::now().to_rfc3339();
        let mut lines = String::new();
        for posting in postings {
            let entry = serde_json::json!({
                "timestamp": timestamp,
                "source": source,
                "title": posting.title,
                "url": posting.url,
            });
            lines.push_str(&serde_json::to_string(&entry)?);
            lines.push('\n');
        }

        self.append(&lines).await.map_err(|e| {
            FreewatchError::Notify(format!("writing {}: {}", self.path.display(), e))
        })
    }
}
