//! resto-sync - review outbox daemon and maintenance commands
//!
//! ```text
//! resto-sync                                   run: flush on startup and on every reconnect
//! resto-sync submit <restaurant_id> <rating> <name> [comments...]
//! resto-sync pending                           list queued reviews
//! resto-sync dead-letters                      list rejected reviews
//! resto-sync requeue                           move rejected reviews back to the queue
//! ```
//!
//! The queue file is held open exclusively by one process. While
//! `resto-sync run` is up, `submit`, `pending`, `dead-letters` and `requeue`
//! against the same `DATA_DIR` fail with "database already open"; stop the
//! daemon first.

use anyhow::Context;
use resto_client::logger::init_logger;
use resto_client::{
    Config, Connectivity, ConnectivityProbe, ConnectivityTrigger, HttpClient, HttpReviewGateway,
    ReviewForm, ReviewOutbox, ReviewQueue,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    let queue = ReviewQueue::open(config.queue_path()).with_context(|| {
        format!(
            "Failed to open review queue at {} (is `resto-sync run` already using it?)",
            config.queue_path().display()
        )
    })?;
    let http = HttpClient::new(&config)?;
    let outbox = ReviewOutbox::new(queue.clone(), Arc::new(HttpReviewGateway::new(http)));

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("run") => run(&config, outbox).await,
        Some("submit") => submit(&outbox, &args[1..]).await,
        Some("pending") => {
            for entry in queue.list_pending()? {
                println!("{}", serde_json::to_string(&entry)?);
            }
            Ok(())
        }
        Some("dead-letters") => {
            for entry in queue.list_dead_letters()? {
                println!("{}", serde_json::to_string(&entry)?);
            }
            Ok(())
        }
        Some("requeue") => {
            let count = queue.requeue_dead_letters()?;
            tracing::info!(count, "Dead letters moved back to the queue");
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown command: {other}"),
    }
}

async fn run(config: &Config, outbox: ReviewOutbox) -> anyhow::Result<()> {
    let stats = outbox.queue().stats()?;
    tracing::info!(
        api = %config.api_base_url,
        pending = stats.pending,
        dead_letters = stats.dead_letters,
        "resto-sync starting"
    );

    let shutdown = CancellationToken::new();
    let connectivity = Connectivity::new(false);

    let probe = ConnectivityProbe::for_base_url(
        &config.api_base_url,
        Duration::from_millis(config.probe_interval_ms),
        connectivity.clone(),
        shutdown.clone(),
    )?;
    let trigger = ConnectivityTrigger::new(outbox.flusher(), connectivity.subscribe(), shutdown.clone())
        .with_startup_delay(Duration::from_millis(config.startup_flush_delay_ms));

    let probe_handle = tokio::spawn(probe.run());
    let trigger_handle = tokio::spawn(trigger.run());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    shutdown.cancel();

    let (probe_res, trigger_res) = tokio::join!(probe_handle, trigger_handle);
    probe_res?;
    trigger_res?;
    Ok(())
}

async fn submit(outbox: &ReviewOutbox, args: &[String]) -> anyhow::Result<()> {
    let [restaurant_id, rating, name, comments @ ..] = args else {
        anyhow::bail!("Usage: resto-sync submit <restaurant_id> <rating> <name> [comments...]");
    };
    let comments = comments.join(" ");
    let form = ReviewForm::from_fields([
        ("restaurant_id", restaurant_id.as_str()),
        ("rating", rating.as_str()),
        ("name", name.as_str()),
        ("comments", comments.as_str()),
    ])?;

    let pending = outbox.submit(form).await?;
    println!("{}", serde_json::to_string(&pending)?);

    // One direct pass so the command reports the outcome before exiting
    let report = outbox.flusher().flush().await?;
    tracing::info!(
        delivered = report.delivered,
        failed = report.failed,
        "Submit finished"
    );
    Ok(())
}
