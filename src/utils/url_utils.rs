//! URL manipulation helpers

use url::Url;

/// Directory of a fetched URL: everything up to (excluding) the last `/`
/// of its path.
///
/// Used to rebase relative `url(...)` references in a stylesheet against
/// the location the stylesheet was actually fetched from, not the page's
/// base URI.
pub fn directory_of(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Ok(dir) = parsed.join(".") {
            return dir.as_str().trim_end_matches('/').to_string();
        }
    }

    // Non-parseable input: fall back to trimming after the last slash that
    // is not part of the scheme separator.
    let scheme_end = url.find("://").map_or(0, |idx| idx + 3);
    match url.rfind('/') {
        Some(idx) if idx >= scheme_end => url[..idx].to_string(),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_filename_from_fetch_url() {
        assert_eq!(directory_of("http://h/css/s.css"), "http://h/css");
    }

    #[test]
    fn root_level_file_keeps_origin() {
        assert_eq!(directory_of("http://h/a.png"), "http://h");
    }

    #[test]
    fn bare_origin_is_unchanged() {
        assert_eq!(directory_of("http://h"), "http://h");
    }

    #[test]
    fn query_string_is_dropped_with_the_filename() {
        assert_eq!(
            directory_of("https://example.com/assets/app.css?v=3"),
            "https://example.com/assets"
        );
    }
}
