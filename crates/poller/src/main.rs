use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pikwy_core::job::{GenerationRequest, DEFAULT_HEIGHT, DEFAULT_IMAGE_COUNT, DEFAULT_WIDTH};
use pikwy_core::types::JobId;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pikwy_poller::auth::StaticToken;
use pikwy_poller::client::BackendClient;
use pikwy_poller::config::PollerConfig;
use pikwy_poller::poller::JobPoller;

#[derive(Parser)]
#[command(name = "pikwy-poller", about = "Submit and track Pikwy generation jobs")]
struct Cli {
    /// Backend base URL (overrides BACKEND_HOST)
    #[arg(long)]
    backend_host: Option<String>,
    /// Bearer token (overrides AUTH_TOKEN)
    #[arg(long)]
    token: Option<String>,
    /// Poll interval in milliseconds (overrides POLLING_INTERVAL_MS)
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Maximum status polls (overrides MAX_POLL_ATTEMPTS)
    #[arg(long)]
    max_attempts: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Queue a generation job and wait for its images
    Generate {
        prompt: String,
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,
        #[arg(long, default_value_t = DEFAULT_IMAGE_COUNT)]
        count: u32,
        /// Print the job id and exit without polling
        #[arg(long)]
        no_wait: bool,
    },
    /// Poll an existing job until it settles
    Status { job_id: String },
    /// Cancel a queued job
    Cancel { job_id: String },
    /// Show the credit balance
    Credits,
    /// Buy one credit bundle
    Purchase,
    /// Check whether the token is accepted
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pikwy_poller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = PollerConfig::from_env();
    if let Some(host) = cli.backend_host {
        config.backend_host = host;
    }
    if let Some(token) = cli.token {
        config.auth_token = Some(token);
    }
    if let Some(ms) = cli.interval_ms {
        config.poll_interval = Duration::from_millis(ms);
    }
    if let Some(attempts) = cli.max_attempts {
        config.max_attempts = attempts;
    }

    let tokens = Arc::new(StaticToken::new(config.auth_token.clone().unwrap_or_default()));
    let client = BackendClient::new(&config.backend_host, tokens);
    let poller = JobPoller::from_config(client, &config);

    // Ctrl-C stops polling; it does not cancel the job on the backend.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Command::Generate {
            prompt,
            width,
            height,
            count,
            no_wait,
        } => {
            let request = GenerationRequest::new(prompt)
                .with_size(width, height)
                .with_count(count);
            request.validate()?;

            let job_id = poller.generate(&request).await?;
            println!("{job_id}");
            if !no_wait {
                let outcome = poller.await_completion(&job_id, &cancel).await?;
                println!("{}", serde_json::to_string_pretty(&outcome.images)?);
                println!("credits: {}", outcome.credits);
            }
        }
        Command::Status { job_id } => {
            let outcome = poller.await_completion(&JobId::from(job_id), &cancel).await?;
            println!("{}", serde_json::to_string_pretty(&outcome.images)?);
            println!("credits: {}", outcome.credits);
        }
        Command::Cancel { job_id } => {
            poller.cancel(&JobId::from(job_id), &cancel).await?;
            println!("Job successfully cancelled.");
        }
        Command::Credits => println!("credits: {}", poller.credits().await?),
        Command::Purchase => println!("credits: {}", poller.purchase_credits().await?),
        Command::Auth => println!("authenticated: {}", poller.authentication_status().await?),
    }

    Ok(())
}
