//! The seam between the event handler and the message broker.
//!
//! The handler only ever talks to [`Connector`] and [`Publisher`], so the
//! broker client can be swapped (or mocked) without touching request handling.

mod kafka;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use self::kafka::{KafkaConnector, KafkaPublisher, RecordSink};

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("no broker addresses configured")]
    NoBrokers,

    #[error("invalid broker address {0:?}, expected host:port")]
    InvalidBroker(String),

    #[error("kafka client: {0}")]
    Client(String),

    #[error("connect did not complete within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("write did not complete within {0:?}")]
    Timeout(Duration),

    #[error("broker rejected write: {0}")]
    Broker(String),

    #[error("publisher is closed")]
    Closed,

    #[error("publish task aborted: {0}")]
    Aborted(String),
}

/// A handle that writes to a single broker connection.
///
/// `publish` blocks until the write is acknowledged or fails. `close` is
/// idempotent and must return without waiting for a `publish` in flight;
/// any `publish` that has not reached the broker by then fails with
/// [`PublishError::Closed`].
pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;

    fn close(&self);
}

/// Builds publishers for a broker list.
pub trait Connector: Send + Sync {
    fn connect(&self, brokers: &[String]) -> Result<Arc<dyn Publisher>, ConnectError>;
}
