use clap::Parser;
use openrpg::{Registry, config, net::http};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "openrpg", version, about = "OpenRPG core server")]
struct Args {
    /// TOML config file (if omitted, configuration comes from the environment / .env)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cfg = Arc::new(match args.config.as_deref() {
        Some(path) => config::Config::load(path)?,
        None => config::Config::from_env()?,
    });

    init_tracing(&cfg.log_level)?;
    tracing::info!(
        store = ?cfg.item_store,
        items_dir = %cfg.items_dir.display(),
        "starting OpenRPG core server"
    );

    let registry = Arc::new(Registry::open(cfg.clone()).await?);

    let addr: SocketAddr = cfg.http_addr.parse()?;
    let result = http::serve(addr, registry.clone(), shutdown_signal()).await;

    registry.close();
    if let Err(e) = &result {
        tracing::error!(error = %e, "http server failed");
    }

    result.map_err(Into::into)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, prelude::*};

    color_eyre::install().map_err(|e| anyhow::anyhow!("failed to install error reporting: {e}"))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_error::ErrorLayer::default())
        .init();

    Ok(())
}
