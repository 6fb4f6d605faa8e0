// Durable JetStream workers.
//
// Both workers create their stream and consumer on startup, then hand
// each message to an async handler: Ok acks the message, Err naks it so
// the server redelivers.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use async_nats::jetstream::{self, consumer, AckKind};
use futures::StreamExt;
use tracing::{debug, error, info, warn};

use super::client::{ensure_stream, NatsConnection};

/// Durable pull consumer fetching messages in fixed-size batches.
pub struct PullWorker {
    jetstream: jetstream::Context,
    stream: String,
    subject: String,
    durable: String,
    batch: usize,
}

impl PullWorker {
    pub fn new(
        conn: &NatsConnection,
        stream: &str,
        subject: &str,
        durable: &str,
        batch: usize,
    ) -> Self {
        Self {
            jetstream: conn.jetstream().clone(),
            stream: stream.to_string(),
            subject: subject.to_string(),
            durable: durable.to_string(),
            batch,
        }
    }

    /// Fetch and process batches until the connection goes away.
    pub async fn run<F, Fut>(&self, handler: F) -> Result<()>
    where
        F: Fn(jetstream::Message) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        info!(durable = %self.durable, subject = %self.subject, "Starting pull worker");
        let consumer = create_consumer(&self.jetstream, &self.stream, &self.subject, &self.durable)
            .await?;
        info!(durable = %self.durable, "Pull worker ready");

        loop {
            let mut batch = consumer
                .fetch()
                .max_messages(self.batch)
                .expires(Duration::from_secs(5))
                .messages()
                .await
                .context("Failed to fetch batch")?;

            while let Some(message) = batch.next().await {
                match message {
                    Ok(message) => dispatch(&handler, message).await,
                    Err(e) => error!(error = %e, "Failed to receive message"),
                }
            }
        }
    }
}

/// Durable consumer processing a continuous message stream.
pub struct StreamWorker {
    jetstream: jetstream::Context,
    stream: String,
    subject: String,
    durable: String,
}

impl StreamWorker {
    pub fn new(conn: &NatsConnection, stream: &str, subject: &str, durable: &str) -> Self {
        Self {
            jetstream: conn.jetstream().clone(),
            stream: stream.to_string(),
            subject: subject.to_string(),
            durable: durable.to_string(),
        }
    }

    /// Process messages until the consumer stream ends.
    pub async fn run<F, Fut>(&self, handler: F) -> Result<()>
    where
        F: Fn(jetstream::Message) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        info!(durable = %self.durable, subject = %self.subject, "Starting stream worker");
        let consumer = create_consumer(&self.jetstream, &self.stream, &self.subject, &self.durable)
            .await?;

        let mut messages = consumer
            .messages()
            .await
            .context("Failed to open message stream")?;
        info!(durable = %self.durable, subject = %self.subject, "Stream worker listening");

        while let Some(message) = messages.next().await {
            match message {
                Ok(message) => dispatch(&handler, message).await,
                Err(e) => error!(error = %e, "Failed to receive message"),
            }
        }

        info!(durable = %self.durable, "Stream worker stopped");
        Ok(())
    }
}

/// Ensure the stream exists and return a durable pull consumer on it.
async fn create_consumer(
    jetstream: &jetstream::Context,
    stream: &str,
    subject: &str,
    durable: &str,
) -> Result<consumer::Consumer<consumer::pull::Config>> {
    ensure_stream(jetstream, stream, subject).await?;

    let stream = jetstream
        .get_stream(stream)
        .await
        .with_context(|| format!("Failed to get stream '{}'", stream))?;

    stream
        .get_or_create_consumer(
            durable,
            consumer::pull::Config {
                durable_name: Some(durable.to_string()),
                filter_subject: subject.to_string(),
                ..Default::default()
            },
        )
        .await
        .with_context(|| format!("Failed to get or create consumer '{}'", durable))
}

/// Run the handler for one message, then ack or nak it.
async fn dispatch<F, Fut>(handler: &F, message: jetstream::Message)
where
    F: Fn(jetstream::Message) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let seq = message
        .info()
        .map(|info| info.stream_sequence)
        .unwrap_or_default();
    debug!(seq, "Handling message");

    match handler(message.clone()).await {
        Ok(()) => {
            if let Err(e) = message.ack().await {
                warn!(seq, error = %e, "Failed to ack message");
            }
        }
        Err(e) => {
            error!(seq, error = %e, "Handler failed, requesting redelivery");
            if let Err(e) = message.ack_with(AckKind::Nak(None)).await {
                warn!(seq, error = %e, "Failed to nak message");
            }
        }
    }
}
