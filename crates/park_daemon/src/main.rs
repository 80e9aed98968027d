use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use park_store::{MemoryStore, RedisStore, StateStore};
use tracing_subscriber::EnvFilter;

mod routes;
mod state;
mod tick_loop;

#[derive(Parser)]
#[command(name = "park_daemon", about = "Coaster fleet scheduling daemon")]
struct Args {
    /// Address to serve the HTTP API on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,
    /// Redis connection URL. Without it the daemon runs on an in-process
    /// store (single-node mode, nothing survives a restart).
    #[arg(long)]
    redis_url: Option<String>,
    /// Seconds between monitor ticks.
    #[arg(long, default_value_t = 2.0)]
    monitor_interval_secs: f64,
    /// Allowed CORS origin for browser clients.
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let store: Arc<dyn StateStore> = match &args.redis_url {
        Some(url) => Arc::new(
            RedisStore::connect(url)
                .await
                .context("connecting to redis")?,
        ),
        None => {
            tracing::warn!("no --redis-url configured, using in-process memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = state::AppState::new(store);
    tick_loop::spawn(
        &app_state,
        Duration::from_secs_f64(args.monitor_interval_secs.max(0.1)),
    );

    let app = routes::make_router_with_cors(app_state, &args.cors_origin);
    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    tracing::info!("listening on {}", args.listen);
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
