use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use progress_daemon::{api::AppState, config::DaemonConfig, http};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "progress-daemon", version, about = "Project progress JSON API")]
struct Cli {
    /// Where the HTTP API will listen.
    #[arg(long, default_value = "0.0.0.0:3001")]
    listen: SocketAddr,

    /// Directory holding `projects/` and `downloads.json`.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Log filter (env-filter syntax). RUST_LOG wins when set.
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log));
    fmt().with_target(false).with_env_filter(filter).init();

    let config = DaemonConfig {
        listen: cli.listen,
        data_dir: cli.data_dir,
    };
    info!("starting daemon with config: {:?}", config);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    let app = http::router(AppState::new(config));

    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
