//! Shared types for fluxversions
//!
//! This crate contains the data structures passed between the cluster access
//! layer and the upgrade evaluation layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Chart version Flux installs when a HelmRelease does not pin one
pub const DEFAULT_CHART_VERSION: &str = "*";

// ============================================================================
// Release Types
// ============================================================================

/// Reference from a release to the object that serves its chart
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceRef {
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

impl SourceRef {
    pub fn new(kind: String, name: String, namespace: String) -> Self {
        Self {
            kind,
            name,
            namespace,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// A HelmRelease as seen by the inspector
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Release {
    pub namespace: String,
    pub name: String,
    pub chart: String,
    /// Declared chart version, verbatim (may lack the `v` prefix)
    pub version: String,
    pub source: SourceRef,
}

impl Release {
    pub fn new(
        namespace: String,
        name: String,
        chart: String,
        version: String,
        source: SourceRef,
    ) -> Self {
        Self {
            namespace,
            name,
            chart,
            version,
            source,
        }
    }

    /// Format as "namespace/name"
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

// ============================================================================
// Repository Index Types
// ============================================================================

/// A chart repository `index.yaml` document
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryIndex {
    #[serde(default)]
    pub api_version: String,

    /// Chart name to its published versions, ordered by chart name
    #[serde(default)]
    pub entries: BTreeMap<String, Vec<IndexEntry>>,
}

impl RepositoryIndex {
    /// Iterate over every entry of every chart, in key order
    pub fn iter_entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values().flatten()
    }

    /// Total number of entries across all charts
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One published version of a chart
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub app_version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub deprecated: bool,
}

impl IndexEntry {
    pub fn new(name: String, version: String) -> Self {
        Self {
            name,
            version,
            ..Default::default()
        }
    }
}

// ============================================================================
// Upgrade Types
// ============================================================================

/// A release for which a newer chart version exists
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Upgrade {
    pub namespace: String,
    pub name: String,
    pub chart: String,
    /// Normalized current version
    pub current: String,
    /// Normalized candidate version
    pub available: String,
}

impl Upgrade {
    pub fn new(release: &Release, current: String, available: String) -> Self {
        Self {
            namespace: release.namespace.clone(),
            name: release.name.clone(),
            chart: release.chart.clone(),
            current,
            available,
        }
    }
}
