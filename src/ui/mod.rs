//! Terminal output for the CLI commands
//!
//! Interactive terminals get `cliclack` styling; pipes and CI get plain
//! bracketed prefixes so output stays grep-friendly.

mod context;
mod output;
mod prompts;

pub use context::UiContext;
pub use output::{intro, key_value, remark, step_info, step_ok, step_ok_detail, step_warn_hint};
pub use prompts::confirm;
