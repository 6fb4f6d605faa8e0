// NATS messaging helpers over async-nats.
//
// `NatsConnection` owns the connection lifecycle. Publishers, subscribers
// and workers hold cheap clones of the client handle and stay valid only
// while the connection is open.

mod client;
mod publisher;
mod subscriber;
mod worker;

pub use client::{NatsConfig, NatsConnection};
pub use publisher::{EventPublisher, StreamPublisher};
pub use subscriber::{EventSubscriber, QueueWorker, Responder};
pub use worker::{PullWorker, StreamWorker};

pub use async_nats::Message;
