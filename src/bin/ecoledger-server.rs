#![forbid(unsafe_code)]
//! REST API server for the EcoLedger traceability service.

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use ecoledger::api::{run_api_server, Service};
use ecoledger::config::load_config;
use ecoledger::ledger::Ledger;

#[derive(Parser)]
#[command(name = "ecoledger-server", version, about = "Serve the traceability ledger over HTTP")]
struct Args {
    /// Override the API port from config.toml
    #[arg(long)]
    port: Option<u16>,

    /// Override the mining difficulty from config.toml
    #[arg(long)]
    difficulty: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = load_config()?;

    let difficulty = args.difficulty.unwrap_or(config.ledger.difficulty);
    let ledger = Ledger::with_limits(difficulty, config.ledger.max_mining_iterations)?;
    info!(
        "Ledger initialized (difficulty = {}, max mining iterations = {})",
        difficulty, config.ledger.max_mining_iterations
    );

    let service = Arc::new(Service::new(ledger));

    let port = args.port.unwrap_or(config.server.api_port);
    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, port).parse()?;

    run_api_server(service, addr).await
}
