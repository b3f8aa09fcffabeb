use std::sync::Arc;
use anyhow::{Context, Result};
use case_import_server::publisher::KafkaConnector;
use case_import_server::server::{self, params::Params};
use case_import_server::{EventHandler, Settings};
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let params = Params::parse();

    tracing_subscriber::fmt()
        .with_max_level(params.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .compact()
        .init();

    info!("case-import-server starting with params: {:?}", params);

    let settings = Settings::resolve(&params.config_paths, params.strict_config)
        .context("resolving configuration")?;
    let connector = Arc::new(KafkaConnector::from_settings(&settings.kafka));
    let handler = Arc::new(EventHandler::new(settings, connector));

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => {
                error!("unable to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        }
        let _ = shutdown_tx.send(());
    });

    server::start(&params, Arc::clone(&handler), shutdown_rx).await?;

    handler.shutdown();
    info!("case-import-server stopped");
    Ok(())
}
