//! `seqlog demo`: two long-poll fetches released by cancellation.

use std::time::Duration;

use anyhow::{Context, Result};
use seqlog_core::{FetchRequest, FetchResponse, LogConfig, LogEngine};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::info;

const PARK_FOR: Duration = Duration::from_millis(20);

pub async fn run() -> Result<()> {
    let config = LogConfig::default()
        .with_event_buffer_size(8)
        .with_publish_queue_size(5)
        .with_fetch_queue_size(5);
    let (engine, log) = LogEngine::<i64>::new(0, &config)?;

    let shutdown = CancellationToken::new();
    let engine = engine.spawn(shutdown.clone());

    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    log.fetch(FetchRequest::new(1, 10, first_tx)).await?;
    log.fetch(FetchRequest::new(1, 10, second_tx)).await?;

    tokio::time::sleep(PARK_FOR).await;
    info!("Cancelling the log");
    shutdown.cancel();

    print_response("first", first_rx.await.context("first fetch dropped")?);
    print_response("second", second_rx.await.context("second fetch dropped")?);

    engine.await??;
    Ok(())
}

fn print_response(label: &str, response: FetchResponse<i64>) {
    println!(
        "{label}: existed={} events={:?}",
        response.existed, response.result
    );
}
