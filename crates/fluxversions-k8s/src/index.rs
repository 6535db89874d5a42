use std::time::Duration;

use kube::Api;

use crate::crd::{HELM_REPOSITORY_KIND, HelmRepository};
use crate::error::{FetchError, IndexError};
use fluxversions_types::{Release, RepositoryIndex, SourceRef};

/// Default deadline for downloading an index artifact
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Parse a chart repository `index.yaml` document
///
/// Like Helm's own loader, an index without `apiVersion` is rejected and
/// entries lacking a name or version are dropped.
pub fn parse_index(bytes: &[u8]) -> Result<RepositoryIndex, IndexError> {
    let mut index: RepositoryIndex = serde_yaml::from_slice(bytes)?;
    if index.api_version.is_empty() {
        return Err(IndexError::MissingApiVersion);
    }

    for (chart, entries) in index.entries.iter_mut() {
        let before = entries.len();
        entries.retain(|e| !e.name.is_empty() && !e.version.is_empty());
        if entries.len() != before {
            tracing::debug!(chart = %chart, dropped = before - entries.len(), "skipped invalid index entries");
        }
    }

    Ok(index)
}

fn http_client(timeout: Duration) -> reqwest::ClientBuilder {
    reqwest::Client::builder().timeout(timeout)
}

/// Resolves a release's HelmRepository and downloads its index artifact
#[derive(Clone)]
pub struct IndexFetcher {
    client: kube::Client,
    http: reqwest::Client,
}

impl IndexFetcher {
    /// Create a fetcher whose artifact downloads give up after `timeout`
    pub fn new(client: kube::Client, timeout: Duration) -> Result<Self, FetchError> {
        let http = http_client(timeout)
            .build()
            .map_err(FetchError::HttpClient)?;
        Ok(Self::from_parts(client, http))
    }

    pub(crate) fn from_parts(client: kube::Client, http: reqwest::Client) -> Self {
        Self { client, http }
    }

    /// Fetch the index backing `release`
    ///
    /// Returns `Ok(None)` when the chart does not come from a HelmRepository.
    pub async fn fetch(&self, release: &Release) -> Result<Option<RepositoryIndex>, FetchError> {
        let source = &release.source;
        if source.kind != HELM_REPOSITORY_KIND {
            tracing::debug!(release = %release.key(), kind = %source.kind, "not a HelmRepository source, skipping");
            return Ok(None);
        }

        let Some(url) = self.artifact_url(source).await? else {
            return Ok(None);
        };
        self.download(&url).await.map(Some)
    }

    /// Look up the artifact URL published in the HelmRepository status
    ///
    /// Returns `Ok(None)` for OCI repositories, which have no index.
    async fn artifact_url(&self, source: &SourceRef) -> Result<Option<String>, FetchError> {
        let repositories: Api<HelmRepository> =
            Api::namespaced(self.client.clone(), &source.namespace);

        let repository = repositories.get(&source.name).await.map_err(|e| match e {
            kube::Error::Api(ref response) if response.code == 404 => {
                FetchError::RepositoryNotFound {
                    namespace: source.namespace.clone(),
                    name: source.name.clone(),
                }
            }
            e => FetchError::Repository {
                namespace: source.namespace.clone(),
                name: source.name.clone(),
                source: e,
            },
        })?;

        if repository.is_oci() {
            tracing::debug!(repository = %source, "OCI HelmRepository has no index, skipping");
            return Ok(None);
        }

        repository
            .artifact_url()
            .map(|url| Some(url.to_string()))
            .ok_or_else(|| FetchError::NoArtifact {
                namespace: source.namespace.clone(),
                name: source.name.clone(),
            })
    }

    /// Download and parse an index document
    pub async fn download(&self, url: &str) -> Result<RepositoryIndex, FetchError> {
        tracing::debug!(url = %url, "fetching chart index");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        parse_index(&body).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}
