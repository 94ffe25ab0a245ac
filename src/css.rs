//! Stylesheet `url(...)` rewriting
//!
//! A fetched stylesheet keeps working only if its relative references are
//! rebased against the directory it was fetched from. This is a pure text
//! transform; no network access happens here.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // Double-quoted, single-quoted, and bare url() forms in one
    // alternation. Nested parentheses and escaped quotes inside url() are
    // not recognized.
    static ref CSS_URL: Regex = Regex::new(
        r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^'"()\s]+))\s*\)"#
    )
    .expect("BUG: hardcoded css url() pattern is invalid - this is a compile-time bug");
}

/// References that are already resolvable from anywhere and must be left
/// byte-identical.
fn keeps_original(path: &str) -> bool {
    path.starts_with("http://")
        || path.starts_with("https://")
        || path.starts_with("data:")
        || path.starts_with('#')
}

/// Rewrite every relative `url(...)` reference in `css` to an absolute one
/// under `base_dir`, the directory the stylesheet was fetched from.
///
/// The original quote character (or its absence) is preserved. `http://`,
/// `https://`, `data:`, and fragment (`#`) references pass through
/// untouched.
pub fn rewrite_css_urls(css: &str, base_dir: &str) -> String {
    CSS_URL
        .replace_all(css, |caps: &Captures| {
            let (quote, path) = if let Some(m) = caps.get(1) {
                ("\"", m.as_str())
            } else if let Some(m) = caps.get(2) {
                ("'", m.as_str())
            } else {
                ("", caps.get(3).map_or("", |m| m.as_str()))
            };

            if keeps_original(path) {
                caps[0].to_string()
            } else {
                format!("url({quote}{base_dir}/{path}{quote})")
            }
        })
        .into_owned()
}
