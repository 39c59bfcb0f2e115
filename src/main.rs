//! riskwatch - Main entry point

use clap::{Parser, Subcommand};
use riskwatch::alert::LogAlertSink;
use riskwatch::monitor::{MonitorJob, RetrainJob, SyntheticTrainer};
use riskwatch::server::{run_server, ServiceConfig};
use riskwatch::store::MemoryStore;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "riskwatch", about = "Credit-risk model serving and monitoring")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the inference service with monitoring jobs
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
        /// Directory for model artifacts
        #[arg(long)]
        models_dir: Option<String>,
        /// Also schedule the retrain job, every N seconds
        #[arg(long)]
        retrain_every_secs: Option<u64>,
    },
    /// Train one candidate model and write its artifact
    Retrain {
        /// Directory for model artifacts
        #[arg(long, default_value = "./models")]
        models_dir: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "riskwatch=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Retrain { models_dir }) => {
            let job = RetrainJob::new(
                Arc::new(MemoryStore::new()),
                Arc::new(SyntheticTrainer),
                Arc::new(LogAlertSink),
                models_dir.into(),
            );
            job.run()?;
        }
        Some(Commands::Serve {
            host,
            port,
            models_dir,
            retrain_every_secs,
        }) => {
            let mut config = ServiceConfig::default();
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(models_dir) = models_dir {
                config.models_dir = models_dir;
            }
            if retrain_every_secs.is_some() {
                config.retrain_interval_secs = retrain_every_secs;
            }
            run_server(config).await?;
        }
        None => {
            run_server(ServiceConfig::default()).await?;
        }
    }

    Ok(())
}
