//! Artifact Worker CLI
//!
//! Runs the batch artifact-generation worker either behind an HTTP trigger
//! endpoint (`serve`) or as a single direct invocation (`run`).

use anyhow::Result;
use artifact_worker::db::{create_pool_from_env, ensure_schema};
use artifact_worker::server::{self, AppState};
use artifact_worker::storage::S3Store;
use artifact_worker::worker::{JobRunner, Outcome};
use artifact_worker::WorkerConfig;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "artifact-worker")]
#[command(about = "Render campaign code batches and bundle downloadable archives")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP trigger endpoint
    Serve {
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        bind: String,
    },

    /// Run a single worker invocation and exit
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env()?;

    let pool = create_pool_from_env().await?;
    ensure_schema(&pool).await?;
    info!("Database connection established");

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let s3 = aws_sdk_s3::Client::new(&aws_config);
    let store = Arc::new(S3Store::new(s3, config.bucket.clone()));

    let secret = config.trigger_secret.clone();
    let runner = Arc::new(JobRunner::new(pool, store, config));

    match cli.command {
        Commands::Serve { bind } => {
            let app = server::router(AppState { runner, secret });
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("Trigger endpoint listening on {}", bind);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }

        Commands::Run => match runner.run_once().await? {
            Outcome::Idle => println!("No work"),
            Outcome::Progressed { job_id, message } => {
                println!("Job {}: {}", job_id, message);
            }
        },
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    } else {
        info!("Received Ctrl+C, shutting down...");
    }
}
