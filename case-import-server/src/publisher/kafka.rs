use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::time::Duration;
use ::kafka::producer::{Producer, Record, RequiredAcks};
use tracing::{debug, info, warn};

use super::{ConnectError, Connector, PublishError, Publisher};
use crate::config::KafkaSettings;

/// Connects to Kafka with all-replica acknowledgment and a bounded ack timeout.
#[derive(Debug, Clone)]
pub struct KafkaConnector {
    client_id: String,
    ack_timeout: Duration,
}

impl KafkaConnector {
    pub fn new(client_id: impl Into<String>, ack_timeout: Duration) -> Self {
        Self {
            client_id: client_id.into(),
            ack_timeout,
        }
    }

    pub fn from_settings(settings: &KafkaSettings) -> Self {
        Self::new(settings.client_id.clone(), settings.write_timeout)
    }
}

impl Connector for KafkaConnector {
    fn connect(&self, brokers: &[String]) -> Result<Arc<dyn Publisher>, ConnectError> {
        let hosts = validate_brokers(brokers)?;
        debug!("connecting kafka producer to {:?}", hosts);

        // No partitioner key is ever set, so the client spreads records
        // across partitions on its own.
        let producer = Producer::from_hosts(hosts)
            .with_client_id(self.client_id.clone())
            .with_required_acks(RequiredAcks::All)
            .with_ack_timeout(self.ack_timeout)
            .create()
            .map_err(|e| ConnectError::Client(e.to_string()))?;

        info!("kafka producer connected to {:?}", brokers);
        Ok(Arc::new(KafkaPublisher::new(producer)))
    }
}

/// The one producer call a [`KafkaPublisher`] makes.
pub trait RecordSink: Send + 'static {
    fn send_record(&mut self, topic: &str, payload: &[u8]) -> Result<(), String>;
}

impl RecordSink for Producer {
    fn send_record(&mut self, topic: &str, payload: &[u8]) -> Result<(), String> {
        self.send(&Record::from_value(topic, payload))
            .map_err(|e| e.to_string())
    }
}

/// Owns one producer. `closed` is checked before every send, so once
/// `close` returns nothing further reaches the broker. A send already on
/// the wire is bounded by the producer's ack timeout.
pub struct KafkaPublisher<S = Producer> {
    sink: Mutex<Option<S>>,
    closed: AtomicBool,
}

impl<S: RecordSink> KafkaPublisher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Mutex::new(Some(sink)),
            closed: AtomicBool::new(false),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl<S: RecordSink> Publisher for KafkaPublisher<S> {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        if self.is_closed() {
            return Err(PublishError::Closed);
        }
        let mut guard = self
            .sink
            .lock()
            .map_err(|e| PublishError::Broker(format!("producer lock poisoned: {e}")))?;

        // close() may have run while this call waited for the lock.
        if self.is_closed() {
            guard.take();
            return Err(PublishError::Closed);
        }
        let sink = guard.as_mut().ok_or(PublishError::Closed)?;
        let result = sink.send_record(topic, payload).map_err(PublishError::Broker);

        if self.is_closed() && guard.take().is_some() {
            debug!("kafka producer closed during a write; dropped after it returned");
        }
        result
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        match self.sink.try_lock() {
            Ok(mut guard) => {
                if guard.take().is_some() {
                    info!("kafka producer closed");
                }
            }
            // The write holding the lock drops the producer when it returns.
            Err(TryLockError::WouldBlock) => {
                debug!("kafka producer busy; closing once the current write returns");
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                warn!("producer lock poisoned while closing; dropping it anyway");
                poisoned.into_inner().take();
            }
        }
    }
}

/// Checks every address is `host:port` with a numeric port.
fn validate_brokers(brokers: &[String]) -> Result<Vec<String>, ConnectError> {
    if brokers.is_empty() {
        return Err(ConnectError::NoBrokers);
    }

    brokers
        .iter()
        .map(|broker| {
            let broker = broker.trim();
            match broker.rsplit_once(':') {
                Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                    Ok(broker.to_string())
                }
                _ => Err(ConnectError::InvalidBroker(broker.to_string())),
            }
        })
        .collect()
}
