#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use case_import_server::publisher::{ConnectError, Connector, PublishError, Publisher};
use case_import_server::{ConnectionMode, KafkaSettings, Settings};
use mockall::mock;
use tempfile::TempDir;

mock! {
    pub BrokerPublisher {}

    impl Publisher for BrokerPublisher {
        fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
        fn close(&self);
    }
}

mock! {
    pub BrokerConnector {}

    impl Connector for BrokerConnector {
        fn connect(&self, brokers: &[String]) -> Result<Arc<dyn Publisher>, ConnectError>;
    }
}

pub const TOPIC: &str = "case-events";
pub const BROKER: &str = "broker-1:9092";

pub fn settings(connection: ConnectionMode) -> Settings {
    Settings {
        kafka: KafkaSettings {
            brokers: vec![BROKER.to_string()],
            topic: TOPIC.to_string(),
            client_id: "case-import-test".to_string(),
            write_timeout: Duration::from_millis(200),
            connection,
        },
    }
}

/// A connector that hands out `publisher` for every successful connect.
pub fn connector_for(publisher: Arc<MockBrokerPublisher>, times: usize) -> MockBrokerConnector {
    let mut connector = MockBrokerConnector::new();
    connector
        .expect_connect()
        .withf(|brokers: &[String]| brokers.len() == 1 && brokers[0] == BROKER)
        .times(times)
        .returning(move |_| {
            let publisher: Arc<dyn Publisher> = publisher.clone();
            Ok(publisher)
        });
    connector
}

/// A publisher whose every write takes `delay` to be acknowledged.
pub fn slow_publisher(delay: Duration) -> MockBrokerPublisher {
    let mut publisher = MockBrokerPublisher::new();
    publisher.expect_publish().returning(move |_, _| {
        std::thread::sleep(delay);
        Ok(())
    });
    publisher
}

pub fn config_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("case_import_test_")
        .tempdir()
        .expect("failed to create temp dir")
}

pub fn config_dir_with(file_name: &str, yaml: &str) -> TempDir {
    let dir = config_dir();
    fs::write(dir.path().join(file_name), yaml).expect("failed to write config file");
    dir
}

/// An environment lookup backed by a fixed map instead of the process env.
pub fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}
