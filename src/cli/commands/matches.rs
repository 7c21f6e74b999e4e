//! Match command - test a title against the keyword set

use crate::cli::args::MatchArgs;
use crate::config::Config;
use crate::error::FreewatchResult;
use crate::matcher::{normalize_title, KeywordMatcher};
use console::style;

/// Execute the match command
pub async fn execute(args: MatchArgs, config: &Config) -> FreewatchResult<()> {
    let matcher = KeywordMatcher::new(&config.keywords.words);

    println!("normalized: {}", normalize_title(&args.title));
    match matcher.first_match(&args.title) {
        Some(keyword) => println!("{} (keyword: {})", style("match").green().bold(), keyword),
        None => println!("{}", style("no match").yellow()),
    }

    Ok(())
}
