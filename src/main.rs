use anyhow::{Context, Result};
use clap::Parser;
use fulfillment_webhook::billing::BillingFacade;
use fulfillment_webhook::graph::Neo4jGateway;
use fulfillment_webhook::{Config, Dispatcher, WebhookServer};
use std::path::PathBuf;
use std::sync::Arc;

/// Billing fulfillment webhook
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Config file (defaults to $FULFILLMENT_CONFIG, then ./config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides server.host)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides server.port)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.server.log_level.as_str()),
    )
    .init();

    log::info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    log::info!("Neo4j: {} as {}", config.neo4j.uri, config.neo4j.user);
    log::info!("Recharge month: {}", config.billing.recharge_month);

    let gateway = Neo4jGateway::connect(&config)
        .await
        .context("Failed to create Neo4j connection pool")?;
    gateway
        .ping()
        .await
        .with_context(|| format!("Neo4j at {} is not reachable", config.neo4j.uri))?;
    log::info!("Graph database reachable");

    let facade = BillingFacade::new(Arc::new(gateway), &config.billing);
    let dispatcher = Dispatcher::new(facade, &config.billing);
    let server = WebhookServer::new(dispatcher, config.server.allowed_origins.clone());

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    server.run(&host, port).await?;

    Ok(())
}
