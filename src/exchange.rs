//! Boundary with the interception host
//!
//! The host terminates TLS, matches request/response pairs, and hands one
//! captured exchange over. It gets back the self-contained body plus the
//! origin base URI; substituting that origin with its own listener address
//! in the final body is the host's job, not this crate's.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::InlineConfig;
use crate::inline::{InlineFailure, InlinePass, InliningReport};

/// Scheme + host (+ non-default port) of an intercepted origin. Immutable
/// for the duration of one inlining pass; relative resource URIs resolve
/// against its rendered form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseUri {
    scheme: String,
    host: String,
    port: u16,
}

impl BaseUri {
    #[must_use]
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    fn is_default_port(&self) -> bool {
        matches!(
            (self.scheme.as_str(), self.port),
            ("http", 80) | ("https", 443)
        )
    }
}

impl fmt::Display for BaseUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_port() {
            write!(f, "{}://{}", self.scheme, self.host)
        } else {
            write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

/// One intercepted HTTP response, as the host captured it.
#[derive(Debug, Clone)]
pub struct InterceptedResponse {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Rewritten body plus the substitution the host still has to apply:
/// every occurrence of `origin` in `body` should become the host's own
/// listener base URI before the exchange is released.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub body: Vec<u8>,
    pub origin: BaseUri,
    pub successes: usize,
    pub failures: Vec<InlineFailure>,
}

/// True for content types this engine rewrites.
fn is_html(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|essence| essence.eq_ignore_ascii_case("text/html"))
}

/// Rewrite one intercepted response.
///
/// Non-HTML bodies pass through untouched. HTML bodies run one top-level
/// inlining pass with a dispatcher of their own, torn down on return.
pub async fn rewrite_response(
    response: InterceptedResponse,
    config: &InlineConfig,
) -> RewriteOutcome {
    let origin = BaseUri::new(response.scheme, response.host, response.port);

    if !is_html(&response.content_type) {
        log::debug!(
            "passing through {} response from {origin}",
            response.content_type
        );
        return RewriteOutcome {
            body: response.body,
            origin,
            successes: 0,
            failures: Vec::new(),
        };
    }

    let html = String::from_utf8_lossy(&response.body).into_owned();
    let pass = InlinePass::new(config.clone());
    let InliningReport {
        html,
        successes,
        failures,
    } = pass.run(html, origin.to_string()).await;

    if !failures.is_empty() {
        log::warn!(
            "{} of {} resources left as external references for {origin}",
            failures.len(),
            successes + failures.len()
        );
    }

    RewriteOutcome {
        body: html.into_bytes(),
        origin,
        successes,
        failures,
    }
}
