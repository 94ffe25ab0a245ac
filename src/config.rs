//! Configuration for one inlining pass

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::constants::{BROWSER_USER_AGENT, DEFAULT_MAX_DEPTH, DEFAULT_WORKERS};

/// Tunables shared by every fetch and every recursive descent of a pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineConfig {
    /// Maximum nested-document recursion depth.
    ///
    /// **INVARIANT:** a pass invoked at a depth beyond this value returns
    /// its document unchanged and issues zero fetches.
    pub max_depth: usize,

    /// Concurrent fetch permits shared by one top-level pass, including
    /// all of its recursive descents.
    pub workers: usize,

    /// Per-request timeout applied to every resource fetch. There is no
    /// other cancellation path into an in-flight fetch.
    pub fetch_timeout: Duration,

    /// Maximum image body size in bytes. Larger bodies fail the fetch and
    /// leave the original `src` in place.
    ///
    /// Typical inlined images: 10-500KB, large: 1-3MB.
    pub max_image_size: usize,

    /// Maximum body size in bytes for text resources: stylesheets,
    /// scripts, and nested documents.
    ///
    /// Typical stylesheets: 50-200KB, large frameworks: 500KB-1MB.
    pub max_text_size: usize,

    /// User-Agent header sent with every fetch.
    pub user_agent: String,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            workers: DEFAULT_WORKERS,
            fetch_timeout: Duration::from_secs(30),
            max_image_size: 5 * 1024 * 1024,
            max_text_size: 2 * 1024 * 1024,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}
