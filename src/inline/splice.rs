//! Sequential result splicing into the document tree
//!
//! Workers return plain strings; only this step touches the tree, on the
//! task that owns it. Results apply in scan order, so the output document
//! is deterministic for a given set of fetch outcomes.

use anyhow::{Context, Result};
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;

use super::scan::{inlinable_source, rel_is_stylesheet};

/// Per-kind splice payloads, in scan order. `None` keeps the original tag
/// as authored.
#[derive(Debug, Default)]
pub struct SpliceSet {
    /// Data URLs replacing `img` `src` attributes.
    pub images: Vec<Option<String>>,
    /// Script bodies replacing `script` `src` references.
    pub scripts: Vec<Option<String>>,
    /// Rewritten stylesheet text replacing `link` tags.
    pub stylesheets: Vec<Option<String>>,
    /// Recursively-inlined HTML for `iframe` `srcdoc` attributes.
    pub frames: Vec<Option<String>>,
}

impl SpliceSet {
    fn applies_nothing(&self) -> bool {
        self.images.iter().all(Option::is_none)
            && self.scripts.iter().all(Option::is_none)
            && self.stylesheets.iter().all(Option::is_none)
            && self.frames.iter().all(Option::is_none)
    }
}

/// Apply all replacements in a single parse/serialize cycle.
///
/// When nothing applies, the input comes back byte-identical; a document
/// whose every fetch failed is indistinguishable from one never processed.
pub fn apply(html: &str, set: SpliceSet) -> Result<String> {
    if set.applies_nothing() {
        return Ok(html.to_string());
    }

    let document = kuchiki::parse_html().one(html);

    // Each block collects its nodes before mutating: detach() during
    // iteration would invalidate the live iterator, and collecting keeps
    // the scan-order pairing stable for all four kinds.

    let matches: Vec<_> = document
        .select("img[src]")
        .map_err(|()| anyhow::anyhow!("invalid img selector"))?
        .filter(|node_ref| {
            let attrs = node_ref.attributes.borrow();
            attrs.get("src").is_some_and(inlinable_source)
        })
        .collect();
    for (node_ref, result) in matches.iter().zip(&set.images) {
        if let Some(data_url) = result {
            let mut attrs = node_ref.attributes.borrow_mut();
            attrs.insert("src", data_url.clone());
            log::debug!("replaced image src with data URL");
        }
    }

    let matches: Vec<_> = document
        .select("script[src]")
        .map_err(|()| anyhow::anyhow!("invalid script selector"))?
        .filter(|node_ref| {
            let attrs = node_ref.attributes.borrow();
            attrs.get("src").is_some_and(inlinable_source)
        })
        .collect();
    for (node_ref, result) in matches.iter().zip(&set.scripts) {
        if let Some(text) = result {
            {
                let mut attrs = node_ref.attributes.borrow_mut();
                attrs.remove("src");
            }
            let node = node_ref.as_node();
            // External script tags are normally empty; drop whatever is
            // there so the fetched text is the only content.
            while let Some(child) = node.first_child() {
                child.detach();
            }
            node.append(NodeRef::new_text(text.clone()));
            log::debug!("inlined script body");
        }
    }

    let matches: Vec<_> = document
        .select("link[href]")
        .map_err(|()| anyhow::anyhow!("invalid link selector"))?
        .filter(|node_ref| {
            let attrs = node_ref.attributes.borrow();
            attrs.get("rel").is_some_and(rel_is_stylesheet)
                && attrs.get("href").is_some_and(inlinable_source)
        })
        .collect();
    for (node_ref, result) in matches.iter().zip(&set.stylesheets) {
        if let Some(css) = result {
            let node = node_ref.as_node();
            node.insert_before(style_element(css)?);
            node.detach();
            log::debug!("replaced stylesheet link with inline style");
        }
    }

    let matches: Vec<_> = document
        .select("iframe[src]")
        .map_err(|()| anyhow::anyhow!("invalid iframe selector"))?
        .filter(|node_ref| {
            let attrs = node_ref.attributes.borrow();
            attrs.get("src").is_some_and(inlinable_source)
        })
        .collect();
    for (node_ref, result) in matches.iter().zip(&set.frames) {
        if let Some(inlined) = result {
            let mut attrs = node_ref.attributes.borrow_mut();
            attrs.insert("srcdoc", inlined.clone());
            attrs.remove("src");
            log::debug!("embedded nested document as srcdoc");
        }
    }

    let mut out = Vec::new();
    document
        .serialize(&mut out)
        .context("failed to serialize document after splicing")?;
    String::from_utf8(out).context("serialized document is not valid UTF-8")
}

/// Build a `<style>` element carrying `css` as raw text.
fn style_element(css: &str) -> Result<NodeRef> {
    let fragment = kuchiki::parse_html().one(format!("<style type=\"text/css\">\n{css}\n</style>"));
    let style = fragment
        .select_first("style")
        .map_err(|()| anyhow::anyhow!("style fragment did not produce a style element"))?;
    Ok(style.as_node().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_result_replaces_src_in_place() {
        let html = r#"<html><body><img src="a.png" alt="x"></body></html>"#;
        let set = SpliceSet {
            images: vec![Some("data:image/png;base64,AQI=".to_string())],
            ..SpliceSet::default()
        };
        let out = apply(html, set).expect("splice failed");
        assert!(out.contains(r#"src="data:image/png;base64,AQI=""#));
        assert!(out.contains(r#"alt="x""#));
    }

    #[test]
    fn script_result_drops_src_and_inlines_text() {
        let html = r#"<html><head><script src="x.js"></script></head></html>"#;
        let set = SpliceSet {
            scripts: vec![Some("var a = 1;".to_string())],
            ..SpliceSet::default()
        };
        let out = apply(html, set).expect("splice failed");
        assert!(out.contains("<script>var a = 1;</script>"));
        assert!(!out.contains("x.js"));
    }

    #[test]
    fn stylesheet_result_swaps_link_for_style() {
        let html = r#"<html><head><link rel="stylesheet" href="s.css"></head></html>"#;
        let set = SpliceSet {
            stylesheets: vec![Some("body{margin:0}".to_string())],
            ..SpliceSet::default()
        };
        let out = apply(html, set).expect("splice failed");
        assert!(out.contains("<style"));
        assert!(out.contains("body{margin:0}"));
        assert!(!out.contains("<link"));
    }

    #[test]
    fn frame_result_becomes_srcdoc() {
        let html = r#"<html><body><iframe src="inner.html"></iframe></body></html>"#;
        let set = SpliceSet {
            frames: vec![Some("<p>inner</p>".to_string())],
            ..SpliceSet::default()
        };
        let out = apply(html, set).expect("splice failed");
        assert!(out.contains("srcdoc="));
        assert!(!out.contains("inner.html"));
    }

    #[test]
    fn none_results_leave_the_input_byte_identical() {
        let html = r#"<html><body><img src="a.png"><script src="x.js"></script></body></html>"#;
        let set = SpliceSet {
            images: vec![None],
            scripts: vec![None],
            ..SpliceSet::default()
        };
        let out = apply(html, set).expect("splice failed");
        assert_eq!(out, html);
    }

    #[test]
    fn mixed_results_only_touch_their_own_tags() {
        let html = concat!(
            r#"<html><body>"#,
            r#"<img src="ok.png">"#,
            r#"<img src="broken.png">"#,
            r#"</body></html>"#
        );
        let set = SpliceSet {
            images: vec![Some("data:image/png;base64,AQI=".to_string()), None],
            ..SpliceSet::default()
        };
        let out = apply(html, set).expect("splice failed");
        assert!(out.contains("data:image/png;base64,AQI="));
        assert!(out.contains(r#"src="broken.png""#));
    }

    #[test]
    fn alternate_stylesheet_links_are_not_paired() {
        // The leading <link> is filtered out on both scan and splice, so
        // the single result lands on the qualifying tag.
        let html = concat!(
            r#"<html><head>"#,
            r#"<link rel="alternate stylesheet" href="alt.css">"#,
            r#"<link rel="stylesheet" href="s.css">"#,
            r#"</head></html>"#
        );
        let set = SpliceSet {
            stylesheets: vec![Some("p{color:red}".to_string())],
            ..SpliceSet::default()
        };
        let out = apply(html, set).expect("splice failed");
        assert!(out.contains("alt.css"));
        assert!(!out.contains("s.css"));
        assert!(out.contains("p{color:red}"));
    }
}
