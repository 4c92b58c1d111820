//! Safe filename generation utilities

use regex::Regex;

/// Maximum length of a sanitized title, keeps paths comfortably short
const MAX_TITLE_LEN: usize = 50;

/// Convert a post title to a safe output filename stem.
///
/// Only ASCII alphanumerics survive; everything else becomes an underscore.
/// The result is truncated to 50 characters.
pub fn to_safe_title(title: &str) -> String {
    let invalid_chars = Regex::new(r"[^a-zA-Z0-9]").unwrap();
    let mut safe = invalid_chars.replace_all(title, "_").to_string();

    if safe.len() > MAX_TITLE_LEN {
        safe.truncate(MAX_TITLE_LEN);
    }

    if safe.chars().all(|c| c == '_') {
        safe = "video".to_string();
    }

    safe
}

/// Build the output filename for a title
pub fn output_filename(title: &str) -> String {
    format!("{}.mp4", to_safe_title(title))
}
