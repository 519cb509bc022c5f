mod api;

use clap::Parser;
use registry_core::{ChainStore, Ed25519Verifier, Registry, SystemClock, VolatileStore};
use registry_storage::SledStore;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8000
    #[arg(long, default_value = "127.0.0.1:8000")]
    listen: String,

    /// Data directory for sled; the chain is kept in memory only when unset
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let store: Box<dyn ChainStore> = match &args.data_dir {
        Some(dir) => Box::new(SledStore::open(dir)?),
        None => {
            info!("no --data-dir given, chain will not outlive this process");
            Box::new(VolatileStore)
        }
    };
    let registry = Arc::new(Registry::open(
        store,
        Arc::new(Ed25519Verifier),
        Arc::new(SystemClock),
    )?);
    info!("registry ready at height {}", registry.height());

    let app = api::router(api::AppState {
        registry: registry.clone(),
    })
    .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = args.listen.parse()?;
    info!("registry-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.close()?;
    info!("registry-node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
