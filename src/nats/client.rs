use std::time::Duration;

use anyhow::{Context, Result};
use async_nats::jetstream::{self, stream};
use serde::Deserialize;
use tracing::{debug, info};

/// NATS configuration
#[derive(Clone, Debug, Deserialize)]
pub struct NatsConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Timeout for request/reply round trips (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_url() -> String {
    std::env::var("NATS_URL").unwrap_or_else(|_| "nats://127.0.0.1:4222".to_string())
}

fn default_request_timeout_ms() -> u64 {
    1000
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Live session to a NATS endpoint, with a JetStream context attached.
///
/// The caller that creates the connection owns it and is responsible for
/// closing it. Adapters created from it hold clones of the underlying
/// client handle and observe closure as publish/subscribe errors.
pub struct NatsConnection {
    server: String,
    client: async_nats::Client,
    jetstream: jetstream::Context,
    request_timeout: Duration,
}

impl NatsConnection {
    /// Connect to `server` and initialize JetStream.
    ///
    /// Fails immediately if the endpoint is unreachable or the handshake
    /// fails; there is no retry or backoff.
    pub async fn connect(server: &str) -> Result<Self> {
        crate::logging::ensure();
        info!("Connecting to NATS at {}", server);

        let client = async_nats::connect(server)
            .await
            .with_context(|| format!("Failed to connect to NATS at {}", server))?;

        let jetstream = jetstream::new(client.clone());
        info!("Connected, JetStream ready");

        Ok(Self {
            server: server.to_string(),
            client,
            jetstream,
            request_timeout: Duration::from_millis(default_request_timeout_ms()),
        })
    }

    /// Connect using a [`NatsConfig`].
    pub async fn connect_with_config(config: &NatsConfig) -> Result<Self> {
        let mut conn = Self::connect(&config.url).await?;
        conn.request_timeout = Duration::from_millis(config.request_timeout_ms);
        Ok(conn)
    }

    /// Server address this connection was established against.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Underlying core NATS client handle.
    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }

    /// JetStream context for stream publishing and consumers.
    pub fn jetstream(&self) -> &jetstream::Context {
        &self.jetstream
    }

    /// Send a request to `subject` and wait for the reply payload.
    ///
    /// Bounded by the configured request timeout (1s unless overridden
    /// via [`NatsConfig`]).
    pub async fn request(&self, subject: &str, payload: &[u8]) -> Result<Vec<u8>> {
        debug!(subject, bytes = payload.len(), "Sending request");

        let reply = tokio::time::timeout(
            self.request_timeout,
            self.client.request(subject.to_string(), payload.to_vec().into()),
        )
        .await
        .with_context(|| format!("Request to '{}' timed out", subject))?
        .with_context(|| format!("Request to '{}' failed", subject))?;

        debug!(subject, bytes = reply.payload.len(), "Received reply");
        Ok(reply.payload.to_vec())
    }

    /// Drain and close the connection.
    ///
    /// Consumes the wrapper, so a closed connection cannot be closed or
    /// used again through it. In-flight subscriptions receive their
    /// remaining messages before the connection shuts down.
    pub async fn close(self) -> Result<()> {
        info!("Draining NATS connection to {}", self.server);
        self.client
            .drain()
            .await
            .context("Failed to drain NATS connection")?;
        info!("NATS connection closed");
        Ok(())
    }
}

/// Create the JetStream stream bound to `subject` if it does not exist.
pub(crate) async fn ensure_stream(
    jetstream: &jetstream::Context,
    name: &str,
    subject: &str,
) -> Result<()> {
    if jetstream.get_stream(name).await.is_ok() {
        debug!(stream = name, "Stream already exists");
        return Ok(());
    }

    info!(stream = name, subject, "Creating stream");
    jetstream
        .create_stream(stream::Config {
            name: name.to_string(),
            subjects: vec![subject.to_string()],
            ..Default::default()
        })
        .await
        .with_context(|| format!("Failed to create stream '{}'", name))?;

    Ok(())
}
