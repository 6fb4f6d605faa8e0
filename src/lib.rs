// Timing instrumentation for closures and futures
pub mod timing;

// Process-wide logging setup
pub mod logging;

// Configuration loading
pub mod config;

// NATS messaging helpers
#[cfg(feature = "nats")]
pub mod nats;
