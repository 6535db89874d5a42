use std::future::Future;
use std::io::Write;

use fluxversions_k8s::{FetchError, IndexFetcher, ListError, ReleaseStream};
use fluxversions_types::{Release, RepositoryIndex, Upgrade};

use crate::evaluator::UpgradeEvaluator;
use crate::reporter::Reporter;

/// Something that can produce the chart index behind a release
pub trait IndexSource {
    /// `Ok(None)` means the release has no index to compare against
    fn fetch_index(
        &self,
        release: &Release,
    ) -> impl Future<Output = Result<Option<RepositoryIndex>, FetchError>> + Send;
}

impl IndexSource for IndexFetcher {
    fn fetch_index(
        &self,
        release: &Release,
    ) -> impl Future<Output = Result<Option<RepositoryIndex>, FetchError>> + Send {
        self.fetch(release)
    }
}

/// Result of inspecting one release
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The release does not come from a chart repository
    Skipped,
    UpToDate,
    Upgrade(Upgrade),
}

/// Counters for one inspection pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub inspected: usize,
    pub upgrades: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Runs fetch, evaluate and report for every release of a pass
pub struct Inspector<S> {
    source: S,
    evaluator: UpgradeEvaluator,
}

impl<S: IndexSource> Inspector<S> {
    pub fn new(source: S, evaluator: UpgradeEvaluator) -> Self {
        Self { source, evaluator }
    }

    /// Inspect a single release
    pub async fn inspect(&self, release: &Release) -> Result<Outcome, FetchError> {
        let Some(index) = self.source.fetch_index(release).await? else {
            return Ok(Outcome::Skipped);
        };

        Ok(match self.evaluator.evaluate(release, &index) {
            Some(upgrade) => Outcome::Upgrade(upgrade),
            None => Outcome::UpToDate,
        })
    }

    /// Inspect every release the stream yields
    ///
    /// Per-release failures are reported and do not stop the pass; a listing
    /// failure ends it and is returned.
    pub async fn run_pass<W: Write>(
        &self,
        releases: &mut ReleaseStream,
        reporter: &mut Reporter<W>,
    ) -> Result<PassSummary, ListError> {
        let mut summary = PassSummary::default();

        while let Some(item) = releases.next().await {
            let release = item?;
            summary.inspected += 1;
            tracing::debug!(
                release = %release.key(),
                chart = %release.chart,
                version = %release.version,
                "found release"
            );

            match self.inspect(&release).await {
                Ok(Outcome::Upgrade(upgrade)) => {
                    summary.upgrades += 1;
                    reporter.upgrade(&upgrade);
                }
                Ok(Outcome::Skipped) => summary.skipped += 1,
                Ok(Outcome::UpToDate) => {}
                Err(e) => {
                    summary.errors += 1;
                    reporter.error(&release, &e);
                }
            }
        }

        Ok(summary)
    }
}
