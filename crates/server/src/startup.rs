use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::Router;
use dotenvy::dotenv;
use kvstore::Store;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::apps::ServerState;
use crate::routes;

/// Options resolved from the command line. `None` fields fall back to
/// environment variables and then `config.toml`.
#[derive(Debug, Default, Clone)]
pub struct ServeOptions {
    pub backing_file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Resolve the bind address: CLI flags, then env vars, then config file.
fn load_bind_addr(opts: &ServeOptions, cfg: &configs::AppConfig) -> anyhow::Result<SocketAddr> {
    let host = opts
        .host
        .clone()
        .or_else(|| env::var("SERVER_HOST").ok())
        .unwrap_or_else(|| cfg.server.host.clone());
    let port = opts
        .port
        .or_else(|| env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()))
        .unwrap_or(cfg.server.port);
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: open the store, build the app and run the HTTP server
/// until shutdown, then close the store.
pub async fn run(opts: ServeOptions) -> anyhow::Result<()> {
    dotenv().ok();

    // a missing config file falls back to defaults inside
    // load_and_validate; a present-but-invalid one aborts startup
    let cfg = configs::AppConfig::load_and_validate()?;

    let backing_file = opts
        .backing_file
        .clone()
        .or_else(|| cfg.store.backing_file.clone());

    if backing_file.is_none() {
        warn!(
            "storing data in-memory only - it will be lost when the server stops; \
             supply a backing file to persist data on disk"
        );
    }

    let store = Store::open(backing_file).await?;
    let state = ServerState {
        store: Arc::clone(&store),
    };

    let app: Router = routes::build_router(state, build_cors());

    let addr = load_bind_addr(&opts, &cfg)?;
    info!(%addr, "starting microstore server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // final flush; every mutation already persisted eagerly
    store.close().await?;
    info!("store closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("received shutdown signal");
}
