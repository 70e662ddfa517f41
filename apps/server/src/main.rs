//! Vertcut render server.
//!
//! Job-oriented HTTP surface over the export compiler and render
//! engine: uploads come in as multipart requests, renders run as
//! background tasks, progress streams out over SSE.

mod error;
mod routes;
mod state;

use clap::Parser;
use vertcut_common::config::AppConfig;
use vertcut_common::logging;

#[derive(Parser, Debug)]
#[command(name = "vertcut-server", version, about = "Vertical video render server")]
struct Args {
    /// Bind address, overriding the configured default.
    #[arg(long)]
    bind: Option<String>,

    /// Emit structured JSON logs.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load();
    if args.json_logs {
        config.logging.json = true;
    }
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    logging::init_logging(&config.logging);

    tokio::fs::create_dir_all(&config.work_dir).await?;
    tokio::fs::create_dir_all(&config.output_dir).await?;

    let bind_addr = config.bind_addr.clone();
    let state = state::AppState::new(config);
    let router = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "vertcut-server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
