//! Kubernetes client for fluxversions
//!
//! This crate provides cluster credential resolution, HelmRelease listing,
//! and download of the chart repository index behind each release.

mod client;
mod crd;
mod error;
mod index;
mod releases;

#[cfg(test)]
mod test_server;

pub use client::{ConfigSource, KubeClient, default_kubeconfig_path, kubeconfig_path, resolve_config};
pub use crd::{
    Artifact, CrossNamespaceObjectReference, HELM_REPOSITORY_KIND, HelmChartTemplate,
    HelmChartTemplateSpec, HelmRelease, HelmReleaseSpec, HelmRepository, HelmRepositorySpec,
    HelmRepositoryStatus,
};
pub use error::{ConfigError, FetchError, IndexError, ListError};
pub use index::{DEFAULT_TIMEOUT, IndexFetcher, parse_index};
pub use releases::{DEFAULT_PAGE_SIZE, ReleaseLister, ReleaseStream};

// Re-export types that are used in our public API
pub use fluxversions_types::{IndexEntry, Release, RepositoryIndex, SourceRef};
