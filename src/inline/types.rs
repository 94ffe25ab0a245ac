//! Type definitions for resource inlining

use crate::fetch::FetchError;

/// Resource kind, for logs and failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Script,
    Stylesheet,
    Frame,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Image => write!(f, "image"),
            ResourceKind::Script => write!(f, "script"),
            ResourceKind::Stylesheet => write!(f, "stylesheet"),
            ResourceKind::Frame => write!(f, "nested document"),
        }
    }
}

/// A resource that could not be inlined. Its tag is left as authored, so
/// the consumer of the document applies its own default handling.
#[derive(Debug, Clone)]
pub struct InlineFailure {
    pub uri: String,
    pub kind: ResourceKind,
    pub error: FetchError,
}

/// Result of one inlining pass with success and failure tracking.
#[derive(Debug, Clone)]
pub struct InliningReport {
    pub html: String,
    pub successes: usize,
    pub failures: Vec<InlineFailure>,
}

impl InliningReport {
    pub(crate) fn untouched(html: String) -> Self {
        Self {
            html,
            successes: 0,
            failures: Vec::new(),
        }
    }

    /// Total number of resources processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.successes + self.failures.len()
    }

    /// Check if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
