//! Outbox worker binary.
//!
//! Connects to Postgres, builds the handler registry, and runs the polling
//! loop until a shutdown signal arrives. Configuration comes from the
//! environment: `DATABASE_URL`, `OUTBOX_BATCH_SIZE`, and
//! `OUTBOX_POLL_INTERVAL_SECS`.

mod handlers;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use praxis_events::{wakeup, HandlerRegistry, OutboxWorker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "praxis_worker=info,praxis_events=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = praxis_db::create_pool(&database_url).await?;
    praxis_db::run_migrations(&pool).await?;
    praxis_db::health_check(&pool).await?;

    let batch_size = env_or("OUTBOX_BATCH_SIZE", 10) as i64;
    let poll_interval = Duration::from_secs(env_or("OUTBOX_POLL_INTERVAL_SECS", 10));

    let mut registry = HandlerRegistry::new();
    handlers::register_handlers(&mut registry);
    tracing::info!(
        subscriptions = registry.total_subscriptions(),
        "Handler registry built"
    );

    // The sender side is handed to in-process publishers; held here so the
    // bridge stays open for the lifetime of the process.
    let (_wake_tx, wake_rx) = wakeup::channel();

    let worker = OutboxWorker::new(pool.clone(), Arc::new(registry))
        .with_batch_size(batch_size)
        .with_poll_interval(poll_interval);

    let cancel = CancellationToken::new();
    let worker_cancel = cancel.clone();
    let worker_task = tokio::spawn(async move { worker.run(worker_cancel, wake_rx).await });

    tracing::info!(batch_size, poll_secs = poll_interval.as_secs(), "Outbox worker started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    cancel.cancel();
    worker_task.await?;

    Ok(())
}

fn env_or(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
