use std::path::PathBuf;

use thiserror::Error;

/// Failure to build a cluster connection
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read kubeconfig {path}: {source}")]
    Read {
        path: PathBuf,
        source: kube::config::KubeconfigError,
    },

    #[error("Failed to create config from kubeconfig {path}: {source}")]
    Load {
        path: PathBuf,
        source: kube::config::KubeconfigError,
    },

    #[error("Failed to create in-cluster config: {0}")]
    InCluster(#[from] kube::config::InClusterError),

    #[error("Failed to create client: {0}")]
    Client(#[source] kube::Error),
}

/// Failure to list HelmReleases
#[derive(Debug, Error)]
pub enum ListError {
    #[error("Failed to list HelmReleases: {0}")]
    Api(#[from] kube::Error),
}

/// Failure to obtain the chart index for one release
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HelmRepository {namespace}/{name} not found")]
    RepositoryNotFound { namespace: String, name: String },

    #[error("Failed to get HelmRepository {namespace}/{name}: {source}")]
    Repository {
        namespace: String,
        name: String,
        source: kube::Error,
    },

    #[error("HelmRepository {namespace}/{name} has no artifact")]
    NoArtifact { namespace: String, name: String },

    #[error("Failed to fetch artifact {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Received a non-success response code {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read artifact {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("Failed to parse chart index from {url}: {source}")]
    Parse { url: String, source: IndexError },

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// An index document that could not be loaded
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no API version specified")]
    MissingApiVersion,
}
