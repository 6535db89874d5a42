//! Upgrade evaluation for fluxversions
//!
//! This crate decides which chart version a release could move to and
//! reports the result.

mod evaluator;
mod filter;
mod inspector;
mod reporter;

pub use evaluator::{UpgradeEvaluator, normalize, parse_version};
pub use filter::{DEFAULT_PRERELEASE_KEYWORDS, PrereleaseFilter};
pub use inspector::{IndexSource, Inspector, Outcome, PassSummary};
pub use reporter::{OutputFormat, Reporter};

// Re-export types used in our public API
pub use fluxversions_types::{Release, RepositoryIndex, Upgrade};
