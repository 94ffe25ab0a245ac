//! Shared configuration constants for pagefuse
//!
//! This module contains default values used throughout the codebase to
//! ensure consistency and avoid magic numbers.

/// Default maximum nested-document recursion depth: 3 levels
///
/// Limits how deep the inliner will follow `iframe` references from the
/// top-level document. Bounds total work against cyclic embeddings (a
/// document embedding itself); it does not bound fan-out at shallow depths.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Default fetch pool size: 6 concurrent requests
///
/// Mirrors typical browser per-host connection parallelism. Not a
/// correctness requirement; any positive value works.
pub const DEFAULT_WORKERS: usize = 6;

/// Browser user agent string sent with every resource fetch
///
/// Some origins refuse or degrade responses to non-browser agents, which
/// would make the inlined page differ from what the browser saw.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
