//! Sink that prints delivered events as JSON lines.

use async_trait::async_trait;
use serde::Serialize;
use seqlog_core::Event;
use seqlog_tail::{EventSink, TailError};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

pub struct JsonLinesSink<W> {
    out: Mutex<W>,
}

impl JsonLinesSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<P, W> EventSink<P> for JsonLinesSink<W>
where
    P: Serialize + Send + Sync + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn publish(&self, events: &[Event<P>]) -> seqlog_tail::Result<()> {
        let mut lines = Vec::new();
        for event in events {
            serde_json::to_writer(&mut lines, event).map_err(|e| TailError::Sink(e.to_string()))?;
            lines.push(b'\n');
        }

        let mut out = self.out.lock().await;
        out.write_all(&lines)
            .await
            .map_err(|e| TailError::Sink(e.to_string()))?;
        out.flush().await.map_err(|e| TailError::Sink(e.to_string()))
    }
}
