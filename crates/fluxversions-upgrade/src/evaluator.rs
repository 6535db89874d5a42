use std::cmp::Ordering;

use semver::Version;

use crate::filter::PrereleaseFilter;
use fluxversions_types::{Release, RepositoryIndex, Upgrade};

/// Prepend `v` to a version string if it is missing
pub fn normalize(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{}", version)
    }
}

/// Parse a normalized version string
///
/// Accepts the `v1` and `v1.2` shorthands for `1.0.0` and `1.2.0`. Returns
/// `None` for anything that is not a semantic version, such as ranges.
pub fn parse_version(version: &str) -> Option<Version> {
    let bare = version.strip_prefix('v').unwrap_or(version);
    if let Ok(parsed) = Version::parse(bare) {
        return Some(parsed);
    }

    let parts = bare.split('.').count();
    let numeric = bare
        .split('.')
        .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    if parts < 3 && numeric {
        return Version::parse(&format!("{}{}", bare, ".0".repeat(3 - parts))).ok();
    }

    None
}

/// Selects the newest eligible chart version for a release
#[derive(Clone, Debug, Default)]
pub struct UpgradeEvaluator {
    filter: PrereleaseFilter,
}

impl UpgradeEvaluator {
    pub fn new(filter: PrereleaseFilter) -> Self {
        Self { filter }
    }

    /// Find the greatest version of the release's chart that is newer than
    /// the declared one and not an excluded prerelease
    ///
    /// A declared version that is not a semantic version, such as `*` or a
    /// range, ranks below every valid index version.
    pub fn evaluate(&self, release: &Release, index: &RepositoryIndex) -> Option<Upgrade> {
        let current_version = normalize(&release.version);
        let current = parse_version(&current_version);
        if current.is_none() {
            tracing::debug!(
                release = %release.key(),
                version = %release.version,
                "declared version is not a semantic version"
            );
        }

        let mut newest: Option<(Version, String)> = None;

        for entry in index.iter_entries().filter(|e| e.name == release.chart) {
            let candidate_version = normalize(&entry.version);
            let Some(candidate) = parse_version(&candidate_version) else {
                tracing::trace!(chart = %entry.name, version = %entry.version, "unparseable index version");
                continue;
            };

            if self.filter.excludes(&candidate) {
                continue;
            }
            if current
                .as_ref()
                .is_some_and(|c| candidate.cmp_precedence(c) != Ordering::Greater)
            {
                continue;
            }

            // Only a strictly greater version replaces the first one seen
            let replaces = newest
                .as_ref()
                .is_none_or(|(best, _)| candidate.cmp_precedence(best) == Ordering::Greater);
            if replaces {
                newest = Some((candidate, candidate_version));
            }
        }

        newest.map(|(_, available)| Upgrade::new(release, current_version, available))
    }
}
