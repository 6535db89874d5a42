//! Flux custom resources read by fluxversions
//!
//! Only the fields the inspector needs are modelled; everything else in the
//! objects is ignored on deserialization.

use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Kind of source that publishes a chart repository index
pub const HELM_REPOSITORY_KIND: &str = "HelmRepository";

// ============================================================================
// helm.toolkit.fluxcd.io
// ============================================================================

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize)]
#[kube(
    group = "helm.toolkit.fluxcd.io",
    version = "v2",
    kind = "HelmRelease",
    plural = "helmreleases",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct HelmReleaseSpec {
    /// Chart template; absent when the release uses `chartRef`
    #[serde(default)]
    pub chart: Option<HelmChartTemplate>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct HelmChartTemplate {
    pub spec: HelmChartTemplateSpec,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartTemplateSpec {
    pub chart: String,

    /// Version or semver range; Flux defaults to `*`
    #[serde(default)]
    pub version: Option<String>,

    pub source_ref: CrossNamespaceObjectReference,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossNamespaceObjectReference {
    pub kind: String,

    pub name: String,

    #[serde(default)]
    pub namespace: Option<String>,
}

// ============================================================================
// source.toolkit.fluxcd.io
// ============================================================================

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize)]
#[kube(
    group = "source.toolkit.fluxcd.io",
    version = "v1",
    kind = "HelmRepository",
    plural = "helmrepositories",
    namespaced,
    status = "HelmRepositoryStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct HelmRepositorySpec {
    #[serde(default)]
    pub url: String,

    /// `default` or `oci`; OCI repositories publish no index artifact
    #[serde(default, rename = "type")]
    pub repository_type: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmRepositoryStatus {
    #[serde(default)]
    pub artifact: Option<Artifact>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default)]
    pub url: String,
}

impl HelmRepository {
    /// OCI repositories are browsed by tag and publish no index
    pub fn is_oci(&self) -> bool {
        self.spec.repository_type.as_deref() == Some("oci")
    }

    /// URL of the last index artifact produced by source-controller
    pub fn artifact_url(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.artifact.as_ref())
            .map(|a| a.url.as_str())
            .filter(|url| !url.is_empty())
    }
}
