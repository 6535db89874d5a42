use std::fmt;
use std::io::{self, Write};

use fluxversions_types::{Release, Upgrade};

/// How report lines are rendered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable sentences
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Writes one line per upgradable release and per failed release
///
/// Write failures are ignored; reporting never fails.
pub struct Reporter<W: Write = io::Stdout> {
    out: W,
    format: OutputFormat,
}

impl Reporter<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Report an available upgrade
    pub fn upgrade(&mut self, upgrade: &Upgrade) {
        let line = match self.format {
            OutputFormat::Text => format!(
                "Release: {}/{} (chart {}) could be upgraded from {} to {}",
                upgrade.namespace, upgrade.name, upgrade.chart, upgrade.current, upgrade.available
            ),
            OutputFormat::Json => serde_json::to_string(upgrade).unwrap_or_default(),
        };
        self.write_line(&line);
    }

    /// Report a release that could not be inspected
    pub fn error(&mut self, release: &Release, error: &dyn fmt::Display) {
        let line = match self.format {
            OutputFormat::Text => format!("Error: {}: {}", release.key(), error),
            OutputFormat::Json => serde_json::json!({
                "namespace": release.namespace,
                "name": release.name,
                "chart": release.chart,
                "error": error.to_string(),
            })
            .to_string(),
        };
        self.write_line(&line);
    }

    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
