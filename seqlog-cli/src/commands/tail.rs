//! `seqlog tail`: publish events and tail them to stdout.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;
use seqlog_core::{Event, LogEngine};
use seqlog_tail::{InMemoryRepository, TailingConsumer};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::AppConfig;
use crate::sink::JsonLinesSink;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Args)]
pub struct TailArgs {
    /// Number of events to publish
    #[arg(short, long, default_value_t = 20)]
    pub events: u64,
}

pub async fn run(args: TailArgs, config: &AppConfig) -> Result<()> {
    if args.events == 0 {
        bail!("--events must be greater than zero");
    }

    let (engine, log) = LogEngine::<i64>::new(0, &config.log)?;
    let repository = Arc::new(InMemoryRepository::<i64>::new());
    let sink = Arc::new(JsonLinesSink::stdout());
    let publisher_id = config.tail.publisher_id;

    let shutdown = CancellationToken::new();
    let engine = engine.spawn(shutdown.clone());
    let consumer = TailingConsumer::new(log.clone(), repository.clone(), sink, &config.tail)?
        .spawn(shutdown.clone());

    // The repository doubles as the durable store so evicted ranges can be
    // served when --events exceeds the log capacity.
    for sequence in 1..=args.events {
        let event = Event::new(sequence, 100 + sequence as i64);
        repository.append(event.clone()).await;
        log.publish(event).await?;
    }
    info!(events = args.events, "Published");

    while repository.cursor(publisher_id).await != Some(args.events) {
        if consumer.is_finished() {
            break;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    shutdown.cancel();
    consumer.await??;
    engine.await??;

    let cursor = repository.cursor(publisher_id).await.unwrap_or_default();
    println!("{publisher_id} cursor persisted at {cursor}");
    Ok(())
}
