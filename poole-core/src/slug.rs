//! Slug generation and title helpers.

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHENS_REGEX: OnceLock<Regex> = OnceLock::new();

/// Convert a string to a URL-safe slug
///
/// # Examples
///
/// ```
/// use poole_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Rust & Safety"), "rust-safety");
/// ```
pub fn slugify(input: &str) -> String {
    let cleaned = input
        .to_lowercase()
        .graphemes(true)
        .filter_map(|g| {
            let c = g.chars().next()?;
            match c {
                ' ' | '_' | '\t' | '\n' | '-' | '/' => Some("-"),
                c if c.is_alphanumeric() => Some(g),
                _ => None,
            }
        })
        .collect::<String>();

    let re = HYPHENS_REGEX.get_or_init(|| Regex::new(r"-+").unwrap());
    re.replace_all(&cleaned, "-").trim_matches('-').to_string()
}

/// Upper-case the first character, leaving the rest untouched
pub fn ucfirst(input: &str) -> String {
    let mut graphemes = input.graphemes(true);
    match graphemes.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), graphemes.as_str()),
        None => String::new(),
    }
}
