pub mod params;
mod listener;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch::Receiver;
use tracing::info;

use crate::server::params::Params;
use crate::types::SharedHandler;

pub use listener::serve;

pub async fn start(params: &Params, handler: SharedHandler, shutdown_rx: Receiver<()>) -> anyhow::Result<()> {
    let addr = params.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener on {addr}"))?;
    info!("case-import-server listening on {}", listener.local_addr()?);
    serve(listener, handler, shutdown_rx).await
}
