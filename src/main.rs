//! Slotbook Server Entry Point

use std::sync::Arc;

use clap::{Parser, Subcommand};
use slotbook::{create_rest_router, Config, MemoryStore, RestApiConfig, ScheduleManager};
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Slotbook: single-owner appointment booking server
#[derive(Parser, Debug)]
#[command(name = "slotbook")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the booking server (default behavior)
    Serve {
        /// HTTP port. If not specified, uses config file value.
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable JSON logging format
        #[arg(long)]
        json_logs: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (port_override, json_logs) = match args.command {
        Some(Command::Serve { port, json_logs }) => (port, json_logs),
        None => (None, false),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    let store = Arc::new(RwLock::new(MemoryStore::with_settings(
        config.booking.clone(),
    )));
    let manager = ScheduleManager::new(store);
    let router = create_rest_router(manager, &RestApiConfig::default());

    let port = port_override.unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.bind, port);
    tracing::info!("Slotbook server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
