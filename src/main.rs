use std::sync::Arc;

use portico::config::Config;
use portico::logging::access;
use portico::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Arc::new(Config::load()?);
    let (log, log_task) = access::start(".");

    tokio::select! {
        res = server::listener::run(Arc::clone(&cfg), log.clone()) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    // Dropping the last producer handle lets the writer drain the queue and
    // exit; awaiting it guarantees no log entry is lost on shutdown.
    drop(log);
    log_task.await?;

    Ok(())
}
