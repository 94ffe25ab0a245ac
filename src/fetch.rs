//! Resource fetching with typed failures
//!
//! Every network, protocol, and decoding problem is folded into a
//! [`FetchError`] value so callers can apply fallback policy without
//! unwinding. The only retry is the single scheme fallback: a URI that
//! fails to parse for lacking a scheme is refetched once as
//! `{base_uri}/{uri}`.

use futures::StreamExt;
use reqwest::Client;
use url::Url;

use crate::config::InlineConfig;

/// Why a resource fetch failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The URI has no scheme and the base fallback did not produce a
    /// fetchable URL either.
    #[error("URI `{0}` has no scheme and no usable base fallback")]
    SchemeMissing(String),

    /// The server answered with a non-2xx/3xx status.
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// DNS, timeout, connection, or body-streaming failure.
    #[error("transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    /// The body could not be used as text or as a document.
    #[error("unusable body from {url}: {message}")]
    Parse { url: String, message: String },
}

/// A successfully fetched resource body. Never partially populated.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// URL the body was actually retrieved from, after the scheme
    /// fallback. Stylesheet rewriting derives its directory from this,
    /// not from the page's base URI.
    pub final_url: String,
    /// Declared `Content-Type`, if the server sent one.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedResource {
    /// Body decoded as UTF-8 text.
    pub fn into_text(self) -> Result<String, FetchError> {
        let FetchedResource {
            final_url, body, ..
        } = self;
        String::from_utf8(body).map_err(|e| FetchError::Parse {
            url: final_url,
            message: e.to_string(),
        })
    }
}

/// Fetch `uri`, resolving schemeless URIs against `base_uri` with a single
/// `"/"`-joined fallback.
///
/// Bodies stream into a pre-allocated buffer; anything past `max_size`
/// bytes fails the fetch. Redirect handling is whatever the client does by
/// default.
pub async fn fetch(
    client: &Client,
    config: &InlineConfig,
    base_uri: &str,
    uri: &str,
    max_size: usize,
) -> Result<FetchedResource, FetchError> {
    match Url::parse(uri) {
        Ok(url) => get(client, config, url, max_size).await,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let joined = format!("{base_uri}/{uri}");
            log::debug!("no scheme in `{uri}`, retrying as {joined}");
            let url =
                Url::parse(&joined).map_err(|_| FetchError::SchemeMissing(uri.to_string()))?;
            get(client, config, url, max_size).await
        }
        Err(e) => Err(FetchError::Transport {
            url: uri.to_string(),
            message: format!("invalid URL: {e}"),
        }),
    }
}

async fn get(
    client: &Client,
    config: &InlineConfig,
    url: Url,
    max_size: usize,
) -> Result<FetchedResource, FetchError> {
    let final_url = url.to_string();

    let response = client
        .get(url)
        .timeout(config.fetch_timeout)
        .header("User-Agent", &config.user_agent)
        .send()
        .await
        .map_err(|e| FetchError::Transport {
            url: final_url.clone(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if !(status.is_success() || status.is_redirection()) {
        return Err(FetchError::Http {
            url: final_url,
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // Enforce the cap from Content-Length before reading anything.
    let expected = response.content_length().unwrap_or(0);
    if expected > max_size as u64 {
        return Err(FetchError::Transport {
            url: final_url,
            message: format!("body of {expected} bytes exceeds the {max_size} byte cap"),
        });
    }

    let mut buffer = if expected > 0 {
        Vec::with_capacity(expected as usize)
    } else {
        Vec::new()
    };

    // Stream with size checking; Content-Length may be absent or lie.
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::Transport {
            url: final_url.clone(),
            message: e.to_string(),
        })?;
        if buffer.len() + chunk.len() > max_size {
            return Err(FetchError::Transport {
                url: final_url.clone(),
                message: format!("body exceeded the {max_size} byte cap mid-stream"),
            });
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(FetchedResource {
        final_url,
        content_type,
        body: buffer,
    })
}
