use std::path::PathBuf;
use anyhow::{Context, Result};
use case_import_client::CaseImportClient;
use case_import_protocol::CaseEvent;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "case-import-client", about = "Submit a case event to a case-import server")]
struct Args {
    #[arg(long, env = "CASE_IMPORT_ADDR", default_value = "127.0.0.1:8888")]
    addr: String,

    /// Event as inline JSON, e.g. '{"caseId":"C1","status":"open"}'
    #[arg(long, conflicts_with = "file")]
    event: Option<String>,

    /// Read the event JSON from a file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Only check that the server answers
    #[arg(long, default_value_t = false)]
    ping: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let mut client = CaseImportClient::connect(&args.addr).await?;

    if args.ping {
        client.ping().await?;
        println!("pong from {}", args.addr);
        return Ok(());
    }

    let raw = match (&args.event, &args.file) {
        (Some(inline), _) => Some(inline.clone()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?,
        ),
        (None, None) => None,
    };
    let event: Option<CaseEvent> = raw
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .context("parsing event JSON")?;

    let response = client.publish_case_event(event).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}
