//! pagefuse: recursive concurrent HTML resource inlining
//!
//! Takes an HTML document plus the base URI it was served from and embeds
//! every externally-hosted resource inline: images become base64 data URLs,
//! scripts and stylesheets become inline elements, and nested documents are
//! resolved recursively (bounded depth) into `srcdoc` attributes. The
//! interception side of a rewriting proxy hands a captured response body to
//! [`exchange::rewrite_response`] and gets the self-contained body back.

pub mod config;
pub mod css;
pub mod dispatch;
pub mod exchange;
pub mod fetch;
pub mod inline;
pub mod utils;

pub use config::InlineConfig;
pub use css::rewrite_css_urls;
pub use dispatch::Dispatcher;
pub use exchange::{BaseUri, InterceptedResponse, RewriteOutcome, rewrite_response};
pub use fetch::{FetchError, FetchedResource, fetch};
pub use inline::{InlineFailure, InlinePass, InliningReport, ResourceKind};
pub use utils::directory_of;
