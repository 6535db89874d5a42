mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;

use fluxversions_k8s::{IndexFetcher, KubeClient, ReleaseLister};
use fluxversions_upgrade::{
    Inspector, OutputFormat, PassSummary, PrereleaseFilter, Reporter, UpgradeEvaluator,
};

use config::{Overrides, Settings};

/// fluxversions - Reports Flux HelmReleases whose chart has a newer version
#[derive(Parser, Debug)]
#[command(name = "fluxversions")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// (optional) absolute path to the kubeconfig file
    #[arg(long, value_name = "PATH")]
    kubeconfig: Option<PathBuf>,

    /// Settings file (defaults to ~/.fluxversions/config.toml if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Keep running, inspecting all releases every interval
    #[arg(long)]
    watch: bool,

    /// Seconds between passes in watch mode
    #[arg(long, value_name = "SECONDS")]
    interval: Option<u64>,

    /// Seconds before a chart index download is abandoned
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Prerelease keyword to exclude; repeat to give several (replaces the defaults)
    #[arg(long = "ignore-prerelease", value_name = "KEYWORD")]
    ignore_prerelease: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Output::Text)]
    output: Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    Text,
    Json,
}

impl From<Output> for OutputFormat {
    fn from(output: Output) -> Self {
        match output {
            Output::Text => OutputFormat::Text,
            Output::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?.apply(Overrides {
        interval_secs: args.interval,
        timeout_secs: args.timeout,
        ignore_prerelease: args.ignore_prerelease,
    });
    settings.validate().context("Invalid settings")?;

    let kube_client = KubeClient::new(args.kubeconfig.as_deref())
        .await
        .context("Failed to configure cluster access")?;
    tracing::info!(source = %kube_client.source(), "using cluster credentials");

    let lister = ReleaseLister::new(kube_client.client()).with_page_size(settings.page_size);
    let fetcher = IndexFetcher::new(kube_client.client(), settings.timeout())?;
    let evaluator = UpgradeEvaluator::new(PrereleaseFilter::new(settings.ignore_prerelease.clone()));
    let inspector = Inspector::new(fetcher, evaluator);
    let mut reporter = Reporter::stdout(args.output.into());

    if !args.watch {
        let mut releases = lister.releases();
        let summary = inspector.run_pass(&mut releases, &mut reporter).await?;
        log_summary(&summary);
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    loop {
        let mut releases = lister.releases();

        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = inspector.run_pass(&mut releases, &mut reporter) => match result {
                Ok(summary) => log_summary(&summary),
                // Retried on the next pass
                Err(e) => tracing::error!(error = %e, "inspection pass aborted"),
            },
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(settings.interval()) => {}
        }
    }

    tracing::info!("shutting down");
    Ok(())
}

fn log_summary(summary: &PassSummary) {
    tracing::info!(
        inspected = summary.inspected,
        upgrades = summary.upgrades,
        skipped = summary.skipped,
        errors = summary.errors,
        "inspection pass complete"
    );
}
