//! Keyword matching for listing titles

use std::collections::HashSet;

/// Punctuation removed from titles before matching
const STRIPPED_PUNCTUATION: [char; 4] = [',', '.', '!', '?'];

/// Normalize a listing title: drop `,.!?` and lowercase.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect::<String>()
        .to_lowercase()
}

/// Case-insensitive substring matcher over a keyword set
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Build a matcher, lowercasing keywords and dropping blank or repeated ones
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();

        Self { keywords }
    }

    /// True if any keyword occurs in the normalized title
    pub fn matches(&self, title: &str) -> bool {
        self.first_match(title).is_some()
    }

    /// First keyword (in configured order) found in the normalized title
    pub fn first_match(&self, title: &str) -> Option<&str> {
        let normalized = normalize_title(title);
        self.keywords
            .iter()
            .find(|k| normalized.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
