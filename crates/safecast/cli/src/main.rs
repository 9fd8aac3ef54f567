//! safecast-deploy - Command-line interface for Safecast environment deployments
//!
//! Operators use it to:
//! - List application versions, platforms and saved templates
//! - Deploy a version onto running environments
//! - Replace environments with new ones on a platform
//! - Refresh saved configuration templates

use clap::{Parser, Subcommand};
use safecast_control::HttpControlPlane;
use safecast_observability::{AuditSink, CompositeSink, HistoryFileSink, StreamAuditSink};
use safecast_types::{EnvironmentClass, TierKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{deploy, inspect, templates, Services};
use config::CliConfig;
use error::CliResult;

const DEFAULT_ENDPOINT: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// safecast-deploy CLI application
#[derive(Parser)]
#[command(name = "safecast-deploy")]
#[command(about = "Deploy Safecast applications to their environments", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SAFECAST_DEPLOY_CONFIG")]
    config: Option<String>,

    /// Control-plane gateway endpoint
    #[arg(long, env = "SAFECAST_CONTROL_PLANE")]
    endpoint: Option<String>,

    /// Directory receiving per-environment deployment history
    #[arg(long, env = "SAFECAST_AUDIT_DIR")]
    audit_dir: Option<PathBuf>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// List available and failed versions of an application
    Versions { app: String },

    /// List platform ARNs for a language
    ListArns {
        #[arg(short, long, default_value = "Ruby")]
        language: String,
    },

    /// Show the settings of a saved configuration template
    DescTemplate { app: String, template: String },

    /// Show the live environments of an application
    Topology { app: String },

    /// Deploy a version onto the running environments
    SameEnv {
        app: String,
        /// Environment class (dev, prd)
        env: EnvironmentClass,
        version: String,
    },

    /// Replace the environments with new ones on a platform
    NewEnv {
        app: String,
        /// Environment class (dev, prd)
        env: EnvironmentClass,
        version: String,
        platform_arn: String,

        /// Skip refreshing the saved templates first
        #[arg(long)]
        skip_templates: bool,
    },

    /// Refresh saved configuration templates from the live environments
    SaveConfigs {
        #[arg(short, long)]
        app: Option<String>,

        /// Environment class (dev, prd)
        #[arg(short, long)]
        env: Option<EnvironmentClass>,

        /// Tier role (web, wrk)
        #[arg(short, long)]
        role: Option<TierKind>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(cli).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = CliConfig::load(cli.config.as_deref())?;

    let endpoint = cli
        .endpoint
        .or_else(|| config.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let timeout = Duration::from_secs(config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS));
    let control = Arc::new(HttpControlPlane::new(&endpoint, timeout)?);

    let stream: Arc<dyn AuditSink> = Arc::new(StreamAuditSink::new(std::io::stderr()));
    let mut sink = CompositeSink::new(vec![stream]);
    if let Some(dir) = cli.audit_dir.or_else(|| config.audit_dir.clone()) {
        sink.add(Arc::new(HistoryFileSink::new(dir)));
    }
    let sink: Arc<dyn AuditSink> = Arc::new(sink);

    let services = Services {
        control,
        sink,
        config,
    };
    let format = cli.output;

    match cli.command {
        Commands::Versions { app } => inspect::versions(&services, &app, format).await,
        Commands::ListArns { language } => inspect::list_arns(&services, &language, format).await,
        Commands::DescTemplate { app, template } => {
            inspect::desc_template(&services, &app, &template, format).await
        }
        Commands::Topology { app } => inspect::topology(&services, &app, format).await,
        Commands::SameEnv { app, env, version } => {
            deploy::same_env(&services, &app, env, &version, format).await
        }
        Commands::NewEnv {
            app,
            env,
            version,
            platform_arn,
            skip_templates,
        } => {
            deploy::new_env(
                &services,
                &app,
                env,
                &version,
                &platform_arn,
                skip_templates,
                format,
            )
            .await
        }
        Commands::SaveConfigs { app, env, role } => {
            templates::save_configs(&services, app, env, role, format).await
        }
    }
}
