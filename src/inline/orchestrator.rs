//! Scan → dispatch → await → splice coordination
//!
//! One [`InlinePass`] owns the HTTP client, configuration, and dispatcher
//! for a top-level document and every nested document discovered under
//! it. Fetches run concurrently; the tree is only ever touched by the
//! coordinating task, after all results are in.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::config::InlineConfig;
use crate::dispatch::Dispatcher;
use crate::fetch::{self, FetchError, FetchedResource};

use super::scan;
use super::splice::{self, SpliceSet};
use super::transcode;
use super::types::{InlineFailure, InliningReport, ResourceKind};

type TaskHandle = JoinHandle<Result<String, FetchError>>;

/// One top-level inlining pass.
///
/// Construct per intercepted document; drop when done. The dispatcher is
/// shared across all recursive descents of this pass and torn down with
/// it.
pub struct InlinePass {
    pub(crate) client: Client,
    pub(crate) config: InlineConfig,
    pub(crate) dispatcher: Dispatcher,
}

impl InlinePass {
    #[must_use]
    pub fn new(config: InlineConfig) -> Arc<Self> {
        let dispatcher = Dispatcher::new(config.workers);
        Arc::new(Self {
            client: Client::new(),
            config,
            dispatcher,
        })
    }

    /// Inline every external resource of `html`, starting at depth 0.
    pub async fn run(self: &Arc<Self>, html: String, base_uri: String) -> InliningReport {
        Arc::clone(self).run_at_depth(html, base_uri, 0).await
    }

    /// Inline one document at `depth`.
    ///
    /// Beyond `max_depth` this is the identity: the input comes back
    /// unmodified and nothing is fetched. A document with no inlinable
    /// references also comes back byte-identical.
    pub fn run_at_depth(
        self: Arc<Self>,
        html: String,
        base_uri: String,
        depth: usize,
    ) -> BoxFuture<'static, InliningReport> {
        Box::pin(async move {
            if depth > self.config.max_depth {
                log::debug!(
                    "depth {depth} exceeds maximum {}, leaving document untouched",
                    self.config.max_depth
                );
                return InliningReport::untouched(html);
            }

            // Scanning: the parsed tree is dropped inside scan(), before
            // any await.
            let refs = scan::scan(&html);
            if refs.is_empty() {
                return InliningReport::untouched(html);
            }
            log::debug!(
                "depth {depth}: {} images, {} scripts, {} stylesheets, {} nested documents",
                refs.images.len(),
                refs.scripts.len(),
                refs.stylesheets.len(),
                refs.frames.len()
            );

            // Dispatching: one task per reference, all through the shared
            // dispatcher. Nested documents are only worth fetching if
            // their pass would still be within the depth budget.
            let image_tasks = self.submit_kind(&refs.images, &base_uri, ResourceKind::Image, depth);
            let script_tasks =
                self.submit_kind(&refs.scripts, &base_uri, ResourceKind::Script, depth);
            let style_tasks =
                self.submit_kind(&refs.stylesheets, &base_uri, ResourceKind::Stylesheet, depth);
            let recurse = depth < self.config.max_depth;
            let frame_tasks = if recurse {
                self.submit_kind(&refs.frames, &base_uri, ResourceKind::Frame, depth)
            } else {
                if !refs.frames.is_empty() {
                    log::debug!(
                        "skipping {} nested documents past the depth budget",
                        refs.frames.len()
                    );
                }
                Vec::new()
            };

            // Awaiting: tasks convert every failure into a value, so this
            // always completes.
            let mut failures = Vec::new();
            let mut successes = 0;
            let frame_count = refs.frames.len();
            let set = SpliceSet {
                images: settle(
                    refs.images,
                    image_tasks,
                    ResourceKind::Image,
                    &mut failures,
                    &mut successes,
                )
                .await,
                scripts: settle(
                    refs.scripts,
                    script_tasks,
                    ResourceKind::Script,
                    &mut failures,
                    &mut successes,
                )
                .await,
                stylesheets: settle(
                    refs.stylesheets,
                    style_tasks,
                    ResourceKind::Stylesheet,
                    &mut failures,
                    &mut successes,
                )
                .await,
                frames: if recurse {
                    settle(
                        refs.frames,
                        frame_tasks,
                        ResourceKind::Frame,
                        &mut failures,
                        &mut successes,
                    )
                    .await
                } else {
                    vec![None; frame_count]
                },
            };

            // Splicing: sequential, on this task, in scan order.
            let html = match splice::apply(&html, set) {
                Ok(spliced) => spliced,
                Err(e) => {
                    log::error!("splice failed, returning document unchanged: {e:#}");
                    html
                }
            };

            InliningReport {
                html,
                successes,
                failures,
            }
        })
    }

    /// Fetch under a dispatcher permit. The permit covers only the
    /// network I/O, so recursive passes submitting to the same pool
    /// cannot starve each other.
    pub(crate) async fn fetch_with_permit(
        &self,
        base_uri: &str,
        uri: &str,
        max_size: usize,
    ) -> Result<FetchedResource, FetchError> {
        let _permit = self.dispatcher.reserve().await;
        fetch::fetch(&self.client, &self.config, base_uri, uri, max_size).await
    }

    fn submit_kind(
        self: &Arc<Self>,
        uris: &[String],
        base_uri: &str,
        kind: ResourceKind,
        depth: usize,
    ) -> Vec<TaskHandle> {
        uris.iter()
            .map(|uri| {
                let pass = Arc::clone(self);
                let base = base_uri.to_string();
                let uri = uri.clone();
                self.dispatcher.submit(async move {
                    match kind {
                        ResourceKind::Image => {
                            transcode::image_to_data_uri(&pass, &base, &uri).await
                        }
                        ResourceKind::Script => transcode::script_to_text(&pass, &base, &uri).await,
                        ResourceKind::Stylesheet => {
                            transcode::stylesheet_to_css(&pass, &base, &uri).await
                        }
                        ResourceKind::Frame => {
                            transcode::frame_to_document(&pass, &base, &uri, depth).await
                        }
                    }
                })
            })
            .collect()
    }
}

/// Pair each reference with its settled task result, in submission order.
/// Failed or panicked tasks become `None` payloads plus a report entry.
async fn settle(
    uris: Vec<String>,
    handles: Vec<TaskHandle>,
    kind: ResourceKind,
    failures: &mut Vec<InlineFailure>,
    successes: &mut usize,
) -> Vec<Option<String>> {
    let results = Dispatcher::await_all(handles).await;
    let mut out = Vec::with_capacity(uris.len());

    for (uri, joined) in uris.into_iter().zip(results) {
        match joined {
            Ok(Ok(content)) => {
                *successes += 1;
                out.push(Some(content));
            }
            Ok(Err(error)) => {
                log::warn!("failed to inline {kind} {uri}: {error}");
                failures.push(InlineFailure { uri, kind, error });
                out.push(None);
            }
            Err(join_error) => {
                log::error!("{kind} task for {uri} aborted: {join_error}");
                let error = FetchError::Transport {
                    url: uri.clone(),
                    message: format!("task aborted: {join_error}"),
                };
                failures.push(InlineFailure { uri, kind, error });
                out.push(None);
            }
        }
    }

    out
}
