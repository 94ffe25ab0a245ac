//! Resource discovery in a parsed document
//!
//! Scanning parses the document once with `scraper` and extracts plain
//! string references synchronously; the parsed tree is dropped before any
//! fetching starts. The splice step applies the same predicates to its own
//! parse, so the i-th reference here pairs with the i-th matching tag
//! there (both parsers build html5ever trees in document order).

use lazy_static::lazy_static;
use scraper::{Html, Selector};

lazy_static! {
    // These selectors are hardcoded and syntactically valid CSS selectors.
    static ref IMG_SELECTOR: Selector = Selector::parse("img[src]")
        .expect("BUG: hardcoded selector 'img[src]' is invalid - this is a compile-time bug");

    static ref SCRIPT_SELECTOR: Selector = Selector::parse("script[src]")
        .expect("BUG: hardcoded selector 'script[src]' is invalid - this is a compile-time bug");

    static ref LINK_SELECTOR: Selector = Selector::parse("link[href]")
        .expect("BUG: hardcoded selector 'link[href]' is invalid - this is a compile-time bug");

    static ref FRAME_SELECTOR: Selector = Selector::parse("iframe[src]")
        .expect("BUG: hardcoded selector 'iframe[src]' is invalid - this is a compile-time bug");
}

/// Ordered source references discovered by one scan. Transient: consumed
/// by the splice step of the same pass.
#[derive(Debug, Clone, Default)]
pub struct ScannedRefs {
    pub images: Vec<String>,
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
    pub frames: Vec<String>,
}

impl ScannedRefs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
            && self.scripts.is_empty()
            && self.stylesheets.is_empty()
            && self.frames.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len() + self.scripts.len() + self.stylesheets.len() + self.frames.len()
    }
}

/// True when a source attribute points at something worth fetching.
/// Already-inlined `data:` sources are skipped.
pub(crate) fn inlinable_source(value: &str) -> bool {
    !value.is_empty() && !value.starts_with("data:")
}

/// True when a `rel` list marks an external stylesheet: the first token
/// must be `stylesheet`. An empty list, or `alternate stylesheet`, does
/// not qualify.
pub(crate) fn rel_is_stylesheet(rel: &str) -> bool {
    rel.split_whitespace()
        .next()
        .is_some_and(|token| token.eq_ignore_ascii_case("stylesheet"))
}

/// Collect the four ordered reference lists from `html`.
///
/// Malformed markup degrades to however html5ever recovers it; a document
/// with nothing inlinable simply yields empty lists.
pub fn scan(html: &str) -> ScannedRefs {
    let document = Html::parse_document(html);
    let mut refs = ScannedRefs::default();

    for element in document.select(&IMG_SELECTOR) {
        if let Some(src) = element.value().attr("src") {
            if inlinable_source(src) {
                refs.images.push(src.to_string());
            }
        }
    }

    for element in document.select(&SCRIPT_SELECTOR) {
        if let Some(src) = element.value().attr("src") {
            if inlinable_source(src) {
                refs.scripts.push(src.to_string());
            }
        }
    }

    for element in document.select(&LINK_SELECTOR) {
        if !rel_is_stylesheet(element.value().attr("rel").unwrap_or("")) {
            continue;
        }
        if let Some(href) = element.value().attr("href") {
            if inlinable_source(href) {
                refs.stylesheets.push(href.to_string());
            }
        }
    }

    for element in document.select(&FRAME_SELECTOR) {
        if let Some(src) = element.value().attr("src") {
            if inlinable_source(src) {
                refs.frames.push(src.to_string());
            }
        }
    }

    refs
}
