use std::future::Future;

use kube::Api;
use kube::api::ListParams;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::crd::HelmRelease;
use crate::error::ListError;
use fluxversions_types::{DEFAULT_CHART_VERSION, Release, SourceRef};

/// Number of HelmReleases requested per list call
pub const DEFAULT_PAGE_SIZE: u32 = 100;

type Item = Result<Release, ListError>;

/// Lists HelmReleases across all namespaces
#[derive(Clone)]
pub struct ReleaseLister {
    api: Api<HelmRelease>,
    page_size: u32,
}

impl ReleaseLister {
    pub fn new(client: kube::Client) -> Self {
        Self {
            api: Api::all(client),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the list page size (0 is treated as 1)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Start a new listing pass
    pub fn releases(&self) -> ReleaseStream {
        let api = self.api.clone();
        let page_size = self.page_size;
        ReleaseStream::spawn(move |sender, cancel| list_pages(api, page_size, sender, cancel))
    }
}

/// Single-pass sequence of releases fed by a background producer
///
/// A listing failure is delivered as an `Err` item and ends the sequence.
pub struct ReleaseStream {
    /// Release receiver
    receiver: mpsc::Receiver<Item>,
    /// Stops the producer when the stream is dropped
    cancel: CancellationToken,
    /// Producer task handle
    task: tokio::task::JoinHandle<()>,
}

impl ReleaseStream {
    fn spawn<F, Fut>(producer: F) -> Self
    where
        F: FnOnce(mpsc::Sender<Item>, CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(producer(sender, cancel.clone()));

        Self {
            receiver,
            cancel,
            task,
        }
    }

    /// Build a stream over already known items
    pub fn from_items(items: Vec<Item>) -> Self {
        Self::spawn(move |sender, cancel| async move {
            for item in items {
                if !deliver(&sender, &cancel, item).await {
                    break;
                }
            }
        })
    }

    /// Receive the next release, or `None` once the listing is exhausted
    pub async fn next(&mut self) -> Option<Item> {
        self.receiver.recv().await
    }
}

impl Drop for ReleaseStream {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

async fn deliver(sender: &mpsc::Sender<Item>, cancel: &CancellationToken, item: Item) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = sender.send(item) => sent.is_ok(),
    }
}

async fn list_pages(
    api: Api<HelmRelease>,
    page_size: u32,
    sender: mpsc::Sender<Item>,
    cancel: CancellationToken,
) {
    let mut continue_token: Option<String> = None;

    loop {
        let mut params = ListParams::default().limit(page_size);
        if let Some(token) = &continue_token {
            params = params.continue_token(token);
        }

        let page = tokio::select! {
            _ = cancel.cancelled() => return,
            page = api.list(&params) => page,
        };

        let list = match page {
            Ok(list) => list,
            Err(e) => {
                tracing::debug!(error = %e, "listing HelmReleases failed");
                deliver(&sender, &cancel, Err(ListError::Api(e))).await;
                return;
            }
        };

        continue_token = list.metadata.continue_.filter(|token| !token.is_empty());
        tracing::trace!(items = list.items.len(), more = continue_token.is_some(), "received page");

        for helm_release in list.items {
            let Some(release) = release_from(helm_release) else {
                continue;
            };
            if !deliver(&sender, &cancel, Ok(release)).await {
                return;
            }
        }

        if continue_token.is_none() {
            return;
        }
    }
}

/// Convert a HelmRelease into a Release, skipping releases without a chart template
fn release_from(helm_release: HelmRelease) -> Option<Release> {
    let namespace = helm_release.metadata.namespace.unwrap_or_default();
    let name = helm_release.metadata.name.unwrap_or_default();

    let Some(chart) = helm_release.spec.chart else {
        tracing::debug!(release = %format!("{}/{}", namespace, name), "no chart template, skipping");
        return None;
    };
    let spec = chart.spec;

    let version = spec
        .version
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CHART_VERSION.to_string());

    // Flux resolves a namespace-less source reference in the release's namespace
    let source_namespace = spec
        .source_ref
        .namespace
        .filter(|ns| !ns.is_empty())
        .unwrap_or_else(|| namespace.clone());

    let source = SourceRef::new(spec.source_ref.kind, spec.source_ref.name, source_namespace);
    Some(Release::new(namespace, name, spec.chart, version, source))
}
