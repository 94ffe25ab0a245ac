//! Per-type fetch-and-transform rules
//!
//! Each transcoder wraps the fetcher with its own post-processing and
//! returns the string the splice step writes into the document. Failures
//! come back as [`FetchError`] values; the orchestrator turns them into
//! the leave-the-tag-alone fallback.

use std::sync::Arc;

use base64::Engine;

use crate::css::rewrite_css_urls;
use crate::fetch::FetchError;
use crate::utils::directory_of;

use super::orchestrator::InlinePass;

/// Fetch an image and encode it as a `data:` URL for its `src` attribute.
pub(crate) async fn image_to_data_uri(
    pass: &InlinePass,
    base_uri: &str,
    src: &str,
) -> Result<String, FetchError> {
    let resource = pass
        .fetch_with_permit(base_uri, src, pass.config.max_image_size)
        .await?;
    let content_type = resource
        .content_type
        .as_deref()
        .unwrap_or("image/jpeg")
        .to_string();

    let encoded_capacity = base64::encoded_len(resource.body.len(), false).unwrap_or(0);
    let mut data_url = String::with_capacity(encoded_capacity + 30 + content_type.len());
    data_url.push_str("data:");
    data_url.push_str(&content_type);
    data_url.push_str(";base64,");
    base64::engine::general_purpose::STANDARD.encode_string(&resource.body, &mut data_url);

    Ok(data_url)
}

/// Fetch a script body to inline as element text.
pub(crate) async fn script_to_text(
    pass: &InlinePass,
    base_uri: &str,
    src: &str,
) -> Result<String, FetchError> {
    let resource = pass
        .fetch_with_permit(base_uri, src, pass.config.max_text_size)
        .await?;
    resource.into_text()
}

/// Fetch a stylesheet and rebase its relative `url(...)` references
/// against the directory of the resolved fetch URI.
pub(crate) async fn stylesheet_to_css(
    pass: &InlinePass,
    base_uri: &str,
    href: &str,
) -> Result<String, FetchError> {
    let resource = pass
        .fetch_with_permit(base_uri, href, pass.config.max_text_size)
        .await?;
    let base_dir = directory_of(&resource.final_url);
    let css = resource.into_text()?;
    Ok(rewrite_css_urls(&css, &base_dir))
}

/// Fetch a nested document and inline it recursively at `depth + 1`,
/// reusing the pass's dispatcher. The returned HTML becomes the parent
/// tag's `srcdoc` content.
pub(crate) async fn frame_to_document(
    pass: &Arc<InlinePass>,
    base_uri: &str,
    src: &str,
    depth: usize,
) -> Result<String, FetchError> {
    let resource = pass
        .fetch_with_permit(base_uri, src, pass.config.max_text_size)
        .await?;
    let html = resource.into_text()?;
    let report = Arc::clone(pass)
        .run_at_depth(html, base_uri.to_string(), depth + 1)
        .await;
    Ok(report.html)
}
