//! Identifier normalization

/// Normalize a posting URL into a cache identifier.
///
/// Trims surrounding whitespace and strips an `http://` or `https://`
/// scheme, so the same posting served over either scheme dedups to one key.
pub fn normalize_identifier(url: &str) -> String {
    let trimmed = url.trim();
    trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .to_string()
}
