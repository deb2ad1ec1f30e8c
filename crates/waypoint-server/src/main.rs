use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::RwLock;

use waypoint_server::config::ServerConfig;
use waypoint_server::registry::AgentRegistry;
use waypoint_server::ws_server::SignalServer;

#[derive(Debug, Parser)]
#[command(name = "waypoint-server")]
#[command(about = "Rendezvous relay for peer-to-peer connection setup")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the config file.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    let registry = Arc::new(RwLock::new(AgentRegistry::new()));
    SignalServer::new(config.bind_addr, registry).run().await
}
