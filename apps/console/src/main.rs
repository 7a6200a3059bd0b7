mod api;
mod config;
mod mock;
mod models;
mod polling;
mod projector;
mod screen;
mod session;
mod submission;
mod view;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::ScreeningClient;
use crate::config::Config;
use crate::mock::{fixture_candidates, MockBackend, ScreeningScript};
use crate::submission::SubmissionRequest;

#[derive(Parser)]
#[command(name = "console", about = "SmartHire screening console", version)]
struct Cli {
    /// Backend base URL; overrides SMARTHIRE_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a screening job and watch it to completion
    Screen {
        /// ZIP archive of CVs to screen
        #[arg(long)]
        zip: PathBuf,

        /// Job description text
        #[arg(long, conflicts_with = "description_file")]
        description: Option<String>,

        /// Read the job description from a file
        #[arg(long)]
        description_file: Option<PathBuf>,

        /// Comma-separated must-have skills (empty means none)
        #[arg(long, default_value = "")]
        must_haves: String,

        /// Poll interval in milliseconds; overrides SMARTHIRE_POLL_INTERVAL_MS
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Probe the backend health endpoint
    Health,

    /// Serve a scripted stand-in backend for local demos
    Mock {
        #[arg(long, default_value_t = 5000)]
        port: u16,

        /// How many resumes the scripted job pretends to process
        #[arg(long, default_value_t = 10)]
        total: u64,

        /// How many candidates the scripted shortlist returns
        #[arg(long, default_value_t = 5)]
        candidates: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config.api_base_url.clone());

    match cli.command {
        Commands::Screen {
            zip,
            description,
            description_file,
            must_haves,
            interval_ms,
        } => {
            let description = match (description, description_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading job description from {}", path.display()))?,
                (None, None) => bail!("provide --description or --description-file"),
            };

            let poll_interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or(config.poll_interval);

            let client = ScreeningClient::new(base_url);
            info!("Screening via backend at {}", client.base_url());

            let request = SubmissionRequest {
                description,
                must_haves,
                archive_path: zip,
            };
            screen::run(client, poll_interval, request).await
        }

        Commands::Health => {
            let client = ScreeningClient::new(base_url);
            let report = client.health().await?;
            println!(
                "{} ({}, version {})",
                report.status,
                report.service.unwrap_or_else(|| "unknown service".to_string()),
                report.version.unwrap_or_else(|| "unknown".to_string()),
            );
            Ok(())
        }

        Commands::Mock {
            port,
            total,
            candidates,
        } => {
            let script = ScreeningScript::completing(total, fixture_candidates(candidates));
            MockBackend::new(script).serve(port).await
        }
    }
}
