use std::future::Future;

use anyhow::{Context, Result};
use async_nats::Message;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::client::NatsConnection;

/// Subscriber for core NATS subjects.
#[derive(Clone)]
pub struct EventSubscriber {
    client: async_nats::Client,
}

impl EventSubscriber {
    pub fn new(conn: &NatsConnection) -> Self {
        Self {
            client: conn.client().clone(),
        }
    }

    /// Subscribe to `subject` and invoke `handler` for every message.
    ///
    /// The subscription is driven by a spawned task; the returned handle
    /// resolves when the subscription ends (connection closed or drained).
    pub async fn subscribe<F, Fut>(&self, subject: &str, handler: F) -> Result<JoinHandle<()>>
    where
        F: Fn(Message) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        info!(subject, "Subscribing");
        let mut subscription = self
            .client
            .subscribe(subject.to_string())
            .await
            .with_context(|| format!("Failed to subscribe to '{}'", subject))?;

        let subject = subject.to_string();
        Ok(tokio::spawn(async move {
            while let Some(message) = subscription.next().await {
                handler(message).await;
            }
            info!(subject = %subject, "Subscription ended");
        }))
    }
}

/// Load-balanced worker on a queue-group subscription.
///
/// Messages on the subject are distributed across all workers sharing the
/// same queue group name.
pub struct QueueWorker {
    client: async_nats::Client,
    subject: String,
    queue: String,
}

impl QueueWorker {
    pub fn new(conn: &NatsConnection, subject: &str, queue: &str) -> Self {
        Self {
            client: conn.client().clone(),
            subject: subject.to_string(),
            queue: queue.to_string(),
        }
    }

    /// Subscribe and process messages until the subscription ends.
    pub async fn run<F, Fut>(&self, handler: F) -> Result<()>
    where
        F: Fn(Message) -> Fut,
        Fut: Future<Output = ()>,
    {
        info!(subject = %self.subject, queue = %self.queue, "Starting queue worker");
        let mut subscription = self
            .client
            .queue_subscribe(self.subject.clone(), self.queue.clone())
            .await
            .with_context(|| format!("Failed to subscribe to '{}'", self.subject))?;
        info!(subject = %self.subject, queue = %self.queue, "Queue worker listening");

        while let Some(message) = subscription.next().await {
            handler(message).await;
        }

        info!(subject = %self.subject, "Queue worker stopped");
        Ok(())
    }
}

/// Replies to requests arriving on a subject.
pub struct Responder {
    client: async_nats::Client,
    subject: String,
}

impl Responder {
    pub fn new(conn: &NatsConnection, subject: &str) -> Self {
        Self {
            client: conn.client().clone(),
            subject: subject.to_string(),
        }
    }

    /// Serve requests until the subscription ends.
    ///
    /// The handler's output is sent back to the requester. A handler
    /// error is logged and the request goes unanswered; the serve loop
    /// keeps running.
    pub async fn serve<F, Fut>(&self, handler: F) -> Result<()>
    where
        F: Fn(Message) -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        info!(subject = %self.subject, "Responder subscribing");
        let mut subscription = self
            .client
            .subscribe(self.subject.clone())
            .await
            .with_context(|| format!("Failed to subscribe to '{}'", self.subject))?;
        info!(subject = %self.subject, "Responder listening");

        while let Some(message) = subscription.next().await {
            let reply = message.reply.clone();
            match handler(message).await {
                Ok(response) => match reply {
                    Some(reply) => {
                        if let Err(e) = self.client.publish(reply, response.into()).await {
                            error!(error = %e, "Failed to send reply");
                        }
                    }
                    None => {
                        warn!(subject = %self.subject, "Request carried no reply subject");
                    }
                },
                Err(e) => error!(error = %e, "Responder handler failed"),
            }
        }

        Ok(())
    }
}
