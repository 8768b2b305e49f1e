use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("empty string not permitted")]
    Empty,

    #[error("after removing characters, slug is zero length")]
    ZeroLength,
}

/// Lower-cases `s` and collapses every run of characters outside `[a-z0-9]`
/// into a single `-`, trimmed at both ends.
pub fn slugify(s: &str) -> Result<String, SlugError> {
    if s.is_empty() {
        return Err(SlugError::Empty);
    }

    // Simple case mapping: one lower-case char per input char.
    let lowered: String = s.chars().filter_map(|c| c.to_lowercase().next()).collect();
    let slug = NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string();

    if slug.is_empty() {
        return Err(SlugError::ZeroLength);
    }
    Ok(slug)
}
