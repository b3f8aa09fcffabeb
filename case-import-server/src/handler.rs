use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use case_import_protocol::{CaseEvent, ImportEventRequest, ImportEventResponse};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{ConnectionMode, Settings};
use crate::publisher::{ConnectError, Connector, PublishError, Publisher};

/// Everything that can stop an event from reaching the topic. The display
/// text is what the caller sees in the failure response.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Error: request event is missing")]
    MissingEvent,

    #[error("Error: Kafka configuration is missing")]
    ConfigMissing,

    #[error("Error initializing message queue: {0}")]
    ProducerConstruction(#[from] ConnectError),

    #[error("Error serializing event data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Error publishing event to message queue: {0}")]
    Publish(#[from] PublishError),
}

/// Serves `PublishCaseEvent`: validates the event, serializes it to JSON and
/// writes it to the configured topic.
///
/// Settings are injected once and never reloaded. Every call leases a
/// publisher for itself alone. In [`ConnectionMode::Shared`] a lease that
/// ends cleanly goes back to an idle pool for the next call, and one whose
/// write failed is closed; in [`ConnectionMode::PerRequest`] every lease is
/// closed when the call ends.
pub struct EventHandler {
    settings: Arc<Settings>,
    connector: Arc<dyn Connector>,
    pool: Mutex<Pool>,
}

#[derive(Default)]
struct Pool {
    idle: Vec<Arc<dyn Publisher>>,
    closed: bool,
}

impl EventHandler {
    pub fn new(settings: Settings, connector: Arc<dyn Connector>) -> Self {
        Self {
            settings: Arc::new(settings),
            connector,
            pool: Mutex::new(Pool::default()),
        }
    }

    /// Never fails: every error becomes a `success: false` response.
    pub async fn publish_case_event(&self, request: ImportEventRequest) -> ImportEventResponse {
        debug!("received PublishCaseEvent request: {:?}", request);

        let Some(event) = request.event else {
            error!("request event is missing");
            return ImportEventResponse::failure(HandlerError::MissingEvent.to_string());
        };

        match self.publish(&event).await {
            Ok(()) => {
                info!(
                    "event {} published to topic '{}'",
                    event.case_id, self.settings.kafka.topic
                );
                ImportEventResponse::published(event.case_id)
            }
            Err(e) => {
                error!("failed to publish event {}: {}", event.case_id, e);
                ImportEventResponse::failure(e.to_string())
            }
        }
    }

    async fn publish(&self, event: &CaseEvent) -> Result<(), HandlerError> {
        if !self.settings.kafka.is_complete() {
            return Err(HandlerError::ConfigMissing);
        }

        let mut lease = self.lease().await?;
        let result = self.write(&lease.publisher, event).await;
        if let Err(HandlerError::Publish(_)) = &result {
            lease.discard();
        }
        result
    }

    async fn write(&self, publisher: &Arc<dyn Publisher>, event: &CaseEvent) -> Result<(), HandlerError> {
        let kafka = &self.settings.kafka;
        let payload = serde_json::to_vec(event)?;
        debug!(
            "publishing to topic '{}': {}",
            kafka.topic,
            String::from_utf8_lossy(&payload)
        );

        let task = {
            let publisher = Arc::clone(publisher);
            let topic = kafka.topic.clone();
            tokio::task::spawn_blocking(move || publisher.publish(&topic, &payload))
        };

        match tokio::time::timeout(kafka.write_timeout, task).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join)) => Err(PublishError::Aborted(join.to_string()).into()),
            Err(_) => Err(PublishError::Timeout(kafka.write_timeout).into()),
        }
    }

    async fn lease(&self) -> Result<Lease<'_>, HandlerError> {
        let idle = match self.settings.kafka.connection {
            ConnectionMode::Shared => self.checkout_idle(),
            ConnectionMode::PerRequest => None,
        };
        let publisher = match idle {
            Some(publisher) => publisher,
            None => self.connect().await?,
        };
        Ok(Lease {
            handler: self,
            publisher,
            healthy: true,
        })
    }

    async fn connect(&self) -> Result<Arc<dyn Publisher>, HandlerError> {
        let timeout = self.settings.kafka.write_timeout;
        let task = {
            let connector = Arc::clone(&self.connector);
            let brokers = self.settings.kafka.brokers.clone();
            tokio::task::spawn_blocking(move || connector.connect(&brokers))
        };

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join)) => Err(ConnectError::Client(format!("connect task aborted: {join}")).into()),
            Err(_) => Err(ConnectError::Timeout(timeout).into()),
        }
    }

    fn checkout_idle(&self) -> Option<Arc<dyn Publisher>> {
        self.pool().idle.pop()
    }

    fn pool(&self) -> MutexGuard<'_, Pool> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Closes every idle publisher. Leases still out are closed when their
    /// call ends instead of being returned.
    pub fn shutdown(&self) {
        let idle = {
            let mut pool = self.pool();
            pool.closed = true;
            std::mem::take(&mut pool.idle)
        };
        if !idle.is_empty() {
            info!("closing {} idle publisher(s)", idle.len());
        }
        for publisher in idle {
            publisher.close();
        }
    }
}

/// A publisher held by exactly one call.
struct Lease<'a> {
    handler: &'a EventHandler,
    publisher: Arc<dyn Publisher>,
    healthy: bool,
}

impl Lease<'_> {
    fn discard(&mut self) {
        self.healthy = false;
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if self.healthy && self.handler.settings.kafka.connection == ConnectionMode::Shared {
            let mut pool = self.handler.pool();
            if !pool.closed {
                pool.idle.push(Arc::clone(&self.publisher));
                return;
            }
        }
        if !self.healthy {
            info!("closing publisher after failed write");
        }
        self.publisher.close();
    }
}
