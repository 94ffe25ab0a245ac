//! Recursive resource inlining
//!
//! One inlining pass scans a document for inlinable tags, fetches and
//! transcodes every referenced resource concurrently, splices the results
//! back in document order, and descends into nested documents with a
//! shared dispatcher until the depth budget runs out.

pub mod orchestrator;
pub mod scan;
pub mod splice;
pub mod transcode;
pub mod types;

pub use orchestrator::InlinePass;
pub use scan::{ScannedRefs, scan};
pub use splice::SpliceSet;
pub use types::{InlineFailure, InliningReport, ResourceKind};
