mod common;

use std::time::Duration;

use case_import_server::{ConfigError, ConfigResolver, ConnectionMode};

use crate::common::{config_dir, config_dir_with, env_of};

#[test]
fn nothing_configured_falls_back_to_defaults() {
    let dir = config_dir();
    let settings = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .with_env(env_of(&[]))
        .resolve()
        .expect("defaults never fail");

    assert_eq!(settings.kafka.brokers, vec!["localhost:9092"]);
    assert_eq!(settings.kafka.topic, "case-events");
    assert_eq!(settings.kafka.write_timeout, Duration::from_secs(10));
    assert_eq!(settings.kafka.connection, ConnectionMode::Shared);
    assert_eq!(settings.kafka.client_id, "case-import");
}

#[test]
fn broker_list_comes_from_env_when_file_has_none() {
    let dir = config_dir();
    let settings = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .with_env(env_of(&[("KAFKA_BROKERS", "a:9092,b:9092")]))
        .resolve()
        .unwrap();

    assert_eq!(settings.kafka.brokers, vec!["a:9092", "b:9092"]);
    assert_eq!(settings.kafka.topic, "case-events");
}

#[test]
fn file_values_win_over_env() {
    let dir = config_dir_with(
        "config.yaml",
        "kafka:\n  brokers:\n    - kafka-1:9092\n    - kafka-2:9092\n  topic: intake\n",
    );
    let settings = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .with_env(env_of(&[
            ("KAFKA_BROKERS", "env:9092"),
            ("KAFKA_TOPIC", "from-env"),
        ]))
        .resolve()
        .unwrap();

    assert_eq!(settings.kafka.brokers, vec!["kafka-1:9092", "kafka-2:9092"]);
    assert_eq!(settings.kafka.topic, "intake");
}

#[test]
fn each_field_falls_back_independently() {
    let dir = config_dir_with("config.yaml", "kafka:\n  topic: intake\n");
    let settings = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .with_env(env_of(&[("KAFKA_BROKERS", "env-1:9092")]))
        .resolve()
        .unwrap();

    assert_eq!(settings.kafka.brokers, vec!["env-1:9092"]);
    assert_eq!(settings.kafka.topic, "intake");
}

#[test]
fn blank_file_values_count_as_unset() {
    let dir = config_dir_with("config.yaml", "kafka:\n  brokers: []\n  topic: \"\"\n");
    let settings = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .with_env(env_of(&[("KAFKA_TOPIC", "from-env")]))
        .resolve()
        .unwrap();

    assert_eq!(settings.kafka.brokers, vec!["localhost:9092"]);
    assert_eq!(settings.kafka.topic, "from-env");
}

#[test]
fn first_search_path_with_a_file_wins() {
    let empty = config_dir();
    let yml = config_dir_with("config.yml", "kafka:\n  topic: second\n");
    let yaml = config_dir_with("config.yaml", "kafka:\n  topic: third\n");

    let settings = ConfigResolver::new(vec![
        empty.path().to_path_buf(),
        yml.path().to_path_buf(),
        yaml.path().to_path_buf(),
    ])
    .with_env(env_of(&[]))
    .resolve()
    .unwrap();

    assert_eq!(settings.kafka.topic, "second");
}

#[test]
fn supplementary_keys_are_read_from_file() {
    let dir = config_dir_with(
        "config.yaml",
        "kafka:\n  client_id: intake-svc\n  write_timeout_ms: 2500\n  connection: per-request\n",
    );
    let settings = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .with_env(env_of(&[]))
        .resolve()
        .unwrap();

    assert_eq!(settings.kafka.client_id, "intake-svc");
    assert_eq!(settings.kafka.write_timeout, Duration::from_millis(2500));
    assert_eq!(settings.kafka.connection, ConnectionMode::PerRequest);
}

#[test]
fn supplementary_keys_fall_back_to_env() {
    let dir = config_dir();
    let settings = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .with_env(env_of(&[
            ("KAFKA_WRITE_TIMEOUT_MS", "750"),
            ("KAFKA_CONNECTION", "per-request"),
        ]))
        .resolve()
        .unwrap();

    assert_eq!(settings.kafka.write_timeout, Duration::from_millis(750));
    assert_eq!(settings.kafka.connection, ConnectionMode::PerRequest);
}

#[test]
fn unparseable_env_timeout_is_rejected() {
    let dir = config_dir();
    let err = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .with_env(env_of(&[("KAFKA_WRITE_TIMEOUT_MS", "ten seconds")]))
        .resolve()
        .unwrap_err();

    match err {
        ConfigError::InvalidValue { key, value } => {
            assert_eq!(key, "kafka.write_timeout_ms");
            assert_eq!(value, "ten seconds");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn zero_timeout_is_rejected_from_file_and_env() {
    let file = config_dir_with("config.yaml", "kafka:\n  write_timeout_ms: 0\n");
    let from_file = ConfigResolver::new(vec![file.path().to_path_buf()])
        .with_env(env_of(&[]))
        .resolve()
        .unwrap_err();

    let empty = config_dir();
    let from_env = ConfigResolver::new(vec![empty.path().to_path_buf()])
        .with_env(env_of(&[("KAFKA_WRITE_TIMEOUT_MS", " 0 ")]))
        .resolve()
        .unwrap_err();

    for err in [from_file, from_env] {
        match err {
            ConfigError::InvalidValue { key, value } => {
                assert_eq!(key, "kafka.write_timeout_ms");
                assert_eq!(value, "0");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}

#[test]
fn malformed_file_is_an_error_not_a_fallback() {
    let dir = config_dir_with("config.yaml", "kafka:\n  brokers: [unterminated\n");
    let err = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .with_env(env_of(&[]))
        .resolve()
        .unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
}

#[test]
fn empty_file_behaves_like_no_file() {
    let dir = config_dir_with("config.yaml", "");
    let settings = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .with_env(env_of(&[]))
        .resolve()
        .unwrap();

    assert_eq!(settings.kafka.topic, "case-events");
}

#[test]
fn strict_mode_refuses_defaults() {
    let dir = config_dir();
    let err = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .strict(true)
        .with_env(env_of(&[]))
        .resolve()
        .unwrap_err();

    match err {
        ConfigError::Missing { key, env } => {
            assert_eq!(key, "kafka.brokers");
            assert_eq!(env, "KAFKA_BROKERS");
        }
        other => panic!("expected Missing, got {other:?}"),
    }
}

#[test]
fn strict_mode_accepts_env_only_configuration() {
    let dir = config_dir();
    let settings = ConfigResolver::new(vec![dir.path().to_path_buf()])
        .strict(true)
        .with_env(env_of(&[
            ("KAFKA_BROKERS", "a:9092"),
            ("KAFKA_TOPIC", "intake"),
        ]))
        .resolve()
        .unwrap();

    assert!(settings.kafka.is_complete());
    assert_eq!(settings.kafka.topic, "intake");
}
