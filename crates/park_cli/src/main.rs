use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use park_ops::Monitor;
use park_store::RedisStore;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "park_cli", about = "Coaster fleet operations console")]
struct Cli {
    /// Redis connection URL of the shared state store.
    #[arg(long, default_value = "redis://127.0.0.1:6379")]
    redis_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one fleet sweep and print the reports.
    Check,
    /// Keep sweeping the fleet on an interval, printing each report.
    Monitor {
        /// Seconds between sweeps.
        #[arg(long, default_value_t = 2.0)]
        interval_secs: f64,
    },
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn run_check(monitor: &Monitor) {
    let reports = monitor.run_tick(Local::now().naive_local()).await;
    if reports.is_empty() {
        println!("no coasters registered");
    }
    for report in reports {
        println!("{report}");
    }
}

async fn run_monitor(monitor: &Monitor, interval_secs: f64) {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(interval_secs.max(0.1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    println!("monitoring fleet every {interval_secs}s, ctrl-c to stop");
    loop {
        interval.tick().await;
        run_check(monitor).await;
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let store = RedisStore::connect(&cli.redis_url)
        .await
        .context("connecting to redis")?;
    let monitor = Monitor::new(Arc::new(store));

    match cli.command {
        Commands::Check => run_check(&monitor).await,
        Commands::Monitor { interval_secs } => run_monitor(&monitor, interval_secs).await,
    }
    Ok(())
}
