//! Confirmation prompts

use super::context::UiContext;
use crate::error::{FreewatchError, FreewatchResult};

/// Ask a yes/no question
///
/// Auto-yes answers `true`; a non-interactive session answers `default`
/// without blocking.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> FreewatchResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on stdin
    let message = message.to_string();
    let answer = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message).initial_value(default).interact()
    })
    .await
    .map_err(|e| FreewatchError::Internal(format!("prompt task failed: {}", e)))?;

    answer.map_err(|e| FreewatchError::User(format!("Prompt failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn auto_yes_approves() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Clear?", false).await.unwrap());
    }

    #[tokio::test]
    async fn non_interactive_uses_default() {
        let ctx = UiContext::non_interactive();
        assert!(!confirm(&ctx, "Clear?", false).await.unwrap());
    }
}
