use semver::Version;

/// Prerelease keywords excluded unless configured otherwise
pub const DEFAULT_PRERELEASE_KEYWORDS: &[&str] = &["rc", "alpha", "beta", "snapshot"];

/// Excludes versions whose prerelease label contains any of a set of keywords
///
/// Matching is a case-sensitive substring test on the label including its
/// leading `-`, so `rc` also excludes `-rc1` and `alpha` excludes
/// `-alphabetical`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrereleaseFilter {
    /// Substrings to look for (never empty strings)
    keywords: Vec<String>,
}

impl PrereleaseFilter {
    /// Create a filter from a keyword list
    ///
    /// Empty keywords are dropped: they would match every version.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords = keywords
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| {
                if k.is_empty() {
                    tracing::warn!("ignoring empty prerelease keyword");
                }
                !k.is_empty()
            })
            .collect();
        Self { keywords }
    }

    /// A filter that excludes nothing
    pub fn none() -> Self {
        Self {
            keywords: Vec::new(),
        }
    }

    /// Check if a version is excluded
    pub fn excludes(&self, version: &Version) -> bool {
        if version.pre.is_empty() {
            return false;
        }
        let label = format!("-{}", version.pre);
        self.keywords.iter().any(|k| label.contains(k.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Check if filter is empty (excludes nothing)
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl Default for PrereleaseFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PRERELEASE_KEYWORDS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_default_keywords() {
        let filter = PrereleaseFilter::default();
        assert!(filter.excludes(&v("2.0.0-rc.1")));
        assert!(filter.excludes(&v("2.0.0-alpha")));
        assert!(filter.excludes(&v("2.0.0-beta.2")));
        assert!(filter.excludes(&v("2.0.0-snapshot")));
        assert!(!filter.excludes(&v("2.0.0")));
    }

    #[test]
    fn test_substring_matching() {
        let filter = PrereleaseFilter::default();
        assert!(filter.excludes(&v("2.0.0-rc1")));
        assert!(filter.excludes(&v("2.0.0-alphabetical")));
        assert!(filter.excludes(&v("2.0.0-pre.src")));
    }

    #[test]
    fn test_case_sensitive() {
        let filter = PrereleaseFilter::default();
        assert!(!filter.excludes(&v("2.0.0-RC1")));
        assert!(!filter.excludes(&v("2.0.0-SNAPSHOT")));
    }

    #[test]
    fn test_build_metadata_is_ignored() {
        let filter = PrereleaseFilter::default();
        assert!(!filter.excludes(&v("2.0.0+rc")));
    }

    #[test]
    fn test_other_prerelease_labels_pass() {
        let filter = PrereleaseFilter::default();
        assert!(!filter.excludes(&v("2.0.0-dev.3")));
        assert!(!filter.excludes(&v("2.0.0-nightly")));
    }

    #[test]
    fn test_custom_keywords() {
        let filter = PrereleaseFilter::new(["dev", ""]);
        assert_eq!(filter.keywords(), ["dev".to_string()]);
        assert!(filter.excludes(&v("2.0.0-dev.3")));
        assert!(!filter.excludes(&v("2.0.0-rc.1")));

        let filter = PrereleaseFilter::new(["-rc"]);
        assert!(filter.excludes(&v("2.0.0-rc.1")));
    }

    #[test]
    fn test_none_excludes_nothing() {
        let filter = PrereleaseFilter::none();
        assert!(filter.is_empty());
        assert!(!filter.excludes(&v("2.0.0-rc.1")));
    }
}
