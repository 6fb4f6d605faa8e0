use anyhow::{Context, Result};
use async_nats::jetstream;
use serde::Serialize;
use tracing::{debug, info};

use super::client::{ensure_stream, NatsConnection};

/// Publisher for core NATS subjects.
///
/// Stateless adapter over a clone of the client handle; valid only while
/// the connection it was created from remains open.
#[derive(Clone)]
pub struct EventPublisher {
    client: async_nats::Client,
}

impl EventPublisher {
    pub fn new(conn: &NatsConnection) -> Self {
        Self {
            client: conn.client().clone(),
        }
    }

    /// Publish `payload` to `subject`.
    ///
    /// Completes once the client has enqueued the message locally; there
    /// is no delivery confirmation. Fails if the connection is closed or
    /// broken.
    pub async fn publish(&self, subject: &str, payload: &[u8]) -> Result<()> {
        debug!(subject, bytes = payload.len(), "Publishing");
        self.client
            .publish(subject.to_string(), payload.to_vec().into())
            .await
            .with_context(|| format!("Failed to publish to '{}'", subject))?;
        Ok(())
    }

    /// Serialize `value` as JSON and publish it to `subject`.
    pub async fn publish_json<T: Serialize>(&self, subject: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_vec(value).context("Failed to serialize payload to JSON")?;
        self.publish(subject, &payload).await
    }
}

/// Publisher for a JetStream stream, pinned to one stream/subject pair.
#[derive(Clone)]
pub struct StreamPublisher {
    jetstream: jetstream::Context,
    stream: String,
    subject: String,
}

impl StreamPublisher {
    pub fn new(conn: &NatsConnection, stream: &str, subject: &str) -> Self {
        Self {
            jetstream: conn.jetstream().clone(),
            stream: stream.to_string(),
            subject: subject.to_string(),
        }
    }

    /// Create the stream if it does not already exist.
    pub async fn ensure_stream(&self) -> Result<()> {
        ensure_stream(&self.jetstream, &self.stream, &self.subject).await
    }

    /// Publish `payload` to the stream and wait for the storage ack.
    ///
    /// Returns the stream sequence the message was stored at.
    pub async fn submit(&self, payload: &[u8]) -> Result<u64> {
        debug!(subject = %self.subject, bytes = payload.len(), "Submitting to stream");

        let ack = self
            .jetstream
            .publish(self.subject.clone(), payload.to_vec().into())
            .await
            .with_context(|| format!("Failed to publish to subject '{}'", self.subject))?
            .await
            .context("Failed to await publish ack")?;

        info!(seq = ack.sequence, subject = %self.subject, "Stored in stream");
        Ok(ack.sequence)
    }

    /// Serialize `value` as JSON and submit it to the stream.
    pub async fn submit_json<T: Serialize>(&self, value: &T) -> Result<u64> {
        let payload = serde_json::to_vec(value).context("Failed to serialize payload to JSON")?;
        self.submit(&payload).await
    }
}
