//! Runtime settings
//!
//! Settings come from built-in defaults, an optional TOML file, and command
//! line flags, in increasing order of precedence.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use fluxversions_k8s::{DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT};
use fluxversions_upgrade::DEFAULT_PRERELEASE_KEYWORDS;

/// Default pause between passes in watch mode
const DEFAULT_INTERVAL_SECS: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Prerelease label substrings that disqualify a candidate version
    pub ignore_prerelease: Vec<String>,
    pub interval_secs: u64,
    pub timeout_secs: u64,
    pub page_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ignore_prerelease: DEFAULT_PRERELEASE_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Values given on the command line
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    /// Replaces the configured keywords when non-empty
    pub ignore_prerelease: Vec<String>,
}

impl Settings {
    /// Get the default settings file path
    fn config_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(home.join(".fluxversions").join("config.toml"))
    }

    /// Load settings from `explicit`, or from the default path if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Apply command line overrides
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(interval) = overrides.interval_secs {
            self.interval_secs = interval;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if !overrides.ignore_prerelease.is_empty() {
            self.ignore_prerelease = overrides.ignore_prerelease;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            bail!("interval must be at least one second");
        }
        if self.timeout_secs == 0 {
            bail!("timeout must be at least one second");
        }
        if self.page_size == 0 {
            bail!("page_size must be positive");
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
