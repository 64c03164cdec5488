//! # NiFi Deploy CLI
//!
//! Command-line interface for deploying templates onto process group branches and
//! starting, stopping or removing those branches.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use nifi_deploy::client::{FlowApi, NifiApiClient};
use nifi_deploy::config::{parse_branch, ConfigLoader, DeployConfig};
use nifi_deploy::logging::init_logging;
use nifi_deploy::orchestration::{DeployRequest, TemplateInstaller};

#[derive(Parser, Debug)]
#[command(name = "nifi-deploy")]
#[command(about = "Deploy and manage NiFi flows on process group branches")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file path (default: ./nifi-deploy.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// NiFi REST API base URL, overriding configuration
    #[arg(short, long)]
    url: Option<String>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Wait between state-change attempts, in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Overall budget for one state change or queue drain, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a template onto a branch, creating missing groups
    Deploy {
        /// Branch written as root>group>sub
        #[arg(short, long)]
        branch: String,
        /// Template XML file
        #[arg(short, long)]
        template: PathBuf,
        /// Bind to same-named controller services already visible from the branch
        #[arg(long)]
        reuse_services: bool,
        /// Start the branch once installed
        #[arg(long)]
        start: bool,
    },
    /// Stop and remove a branch and its templates
    Undeploy {
        #[arg(short, long)]
        branch: String,
    },
    /// Start every processor of a branch
    Start {
        #[arg(short, long)]
        branch: String,
    },
    /// Stop every processor of a branch, draining queues
    Stop {
        #[arg(short, long)]
        branch: String,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut DeployConfig) {
        if let Some(url) = &self.url {
            config.nifi.base_url = url.clone();
        }
        if let Some(interval_ms) = self.interval_ms {
            config.lifecycle.interval_ms = interval_ms;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.lifecycle.timeout_ms = timeout_ms;
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ConfigLoader::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("validating configuration")?;

    info!(
        base_url = %config.nifi.base_url,
        interval_ms = config.lifecycle.interval_ms,
        timeout_ms = config.lifecycle.timeout_ms,
        "NiFi deploy starting"
    );

    let api: Arc<dyn FlowApi> = Arc::new(
        NifiApiClient::connect(config.nifi.clone())
            .await
            .context("connecting to NiFi")?,
    );
    let installer = TemplateInstaller::new(api, &config.lifecycle);

    match cli.command {
        Commands::Deploy {
            branch,
            template,
            reuse_services,
            start,
        } => {
            let request = DeployRequest {
                branch: parse_branch(&branch)?,
                template,
                reuse_services,
                start,
            };
            let group = installer
                .deploy(&request)
                .await
                .with_context(|| format!("deploying {} onto {branch}", request.template.display()))?;
            println!("Deployed {} as process group {}", branch, group.id());
        }
        Commands::Undeploy { branch } => {
            installer
                .undeploy(&parse_branch(&branch)?)
                .await
                .with_context(|| format!("undeploying {branch}"))?;
        }
        Commands::Start { branch } => {
            installer
                .start_branch(&parse_branch(&branch)?)
                .await
                .with_context(|| format!("starting {branch}"))?;
        }
        Commands::Stop { branch } => {
            installer
                .stop_branch(&parse_branch(&branch)?)
                .await
                .with_context(|| format!("stopping {branch}"))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
