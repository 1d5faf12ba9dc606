use anyhow::Result;
use axum::Router;
use clap::Parser;
use retrieval::{Preset, RankingConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Directory holding the loaded index tables
    #[arg(long, default_value = "./index")]
    index: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Ranking preset: default, hybrid or precision
    #[arg(long, default_value = "default")]
    preset: String,
    /// JSON file whose fields override the preset
    #[arg(long)]
    ranking_config: Option<PathBuf>,
    /// Stop posting-list scans after this many milliseconds per query
    #[arg(long)]
    query_timeout_ms: Option<u64>,
}

fn ranking_config(args: &Args) -> Result<RankingConfig> {
    let preset: Preset = args.preset.parse()?;
    let mut config = RankingConfig::preset(preset);
    if let Some(path) = &args.ranking_config {
        config = config.load_overrides(path)?;
    }
    if args.query_timeout_ms.is_some() {
        config.query_timeout_ms = args.query_timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let ranking = ranking_config(&args)?;
    tracing::info!(preset = %args.preset, ?ranking, "ranking configuration");
    let app: Router = build_app(args.index.clone(), ranking)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
