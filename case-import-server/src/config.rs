use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_BROKERS: &[&str] = &["localhost:9092"];
pub const DEFAULT_TOPIC: &str = "case-events";
pub const DEFAULT_CLIENT_ID: &str = "case-import";
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

const CONFIG_NAME: &str = "config";
const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml"];
const DEFAULT_SEARCH_PATHS: &[&str] = &["./conf", "."];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("`{key}` is not set in the config file or ${env}")]
    Missing { key: &'static str, env: String },

    #[error("invalid value {value:?} for `{key}`")]
    InvalidValue { key: &'static str, value: String },
}

/// How the handler holds its broker connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionMode {
    /// Connections opened on demand and pooled; each call has one to itself,
    /// and a connection is dropped after its first failed write.
    #[default]
    Shared,
    /// A fresh connection for every call, closed before the call returns.
    PerRequest,
}

impl std::str::FromStr for ConnectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "shared" => Ok(ConnectionMode::Shared),
            "per-request" | "per_request" => Ok(ConnectionMode::PerRequest),
            other => Err(other.to_string()),
        }
    }
}

/// Fully resolved settings. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub kafka: KafkaSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaSettings {
    pub brokers: Vec<String>,
    pub topic: String,
    pub client_id: String,
    pub write_timeout: Duration,
    pub connection: ConnectionMode,
}

impl KafkaSettings {
    /// Both a broker list and a topic are required before anything is published.
    pub fn is_complete(&self) -> bool {
        !self.brokers.is_empty() && !self.topic.is_empty()
    }
}

impl Default for KafkaSettings {
    fn default() -> Self {
        Self {
            brokers: DEFAULT_BROKERS.iter().map(|b| b.to_string()).collect(),
            topic: DEFAULT_TOPIC.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            connection: ConnectionMode::default(),
        }
    }
}

impl Settings {
    /// Resolve from `config.yaml` in `paths` (or the default search paths)
    /// with the process environment as fallback.
    pub fn resolve(paths: &[PathBuf], strict: bool) -> Result<Self, ConfigError> {
        ConfigResolver::new(paths.to_vec()).strict(strict).resolve()
    }
}

/// File shape. Every field is optional so a partial file still decodes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    kafka: FileKafka,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileKafka {
    brokers: Vec<String>,
    topic: Option<String>,
    client_id: Option<String>,
    write_timeout_ms: Option<u64>,
    connection: Option<ConnectionMode>,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Layers the config file, then environment variables, then built-in
/// defaults. Each field is resolved independently and the first non-empty
/// source wins.
pub struct ConfigResolver {
    search_paths: Vec<PathBuf>,
    strict: bool,
    env: EnvLookup,
}

impl ConfigResolver {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        let search_paths = if search_paths.is_empty() {
            DEFAULT_SEARCH_PATHS.iter().map(PathBuf::from).collect()
        } else {
            search_paths
        };
        Self {
            search_paths,
            strict: false,
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Refuse to fall back to defaults for the broker list and topic.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let file = match self.find_config_file() {
            Some(path) => {
                info!("loading config from {:?}", path);
                read_config_file(&path)?
            }
            None => {
                info!(
                    "config file not found in {:?}; using environment variables or defaults",
                    self.search_paths
                );
                FileConfig::default()
            }
        };
        let file = file.kafka;

        let mut brokers = clean_brokers(file.brokers);
        if brokers.is_empty() {
            brokers = self
                .env_value("kafka.brokers")
                .map(|raw| clean_brokers(raw.split(',').map(str::to_string)))
                .unwrap_or_default();
        }
        if brokers.is_empty() {
            self.require("kafka.brokers")?;
            brokers = KafkaSettings::default().brokers;
            warn!("kafka brokers not found in config or env, using default: {:?}", brokers);
        }

        let mut topic = non_empty(file.topic).or_else(|| self.env_value("kafka.topic"));
        if topic.is_none() {
            self.require("kafka.topic")?;
            warn!("kafka topic not found in config or env, using default: {}", DEFAULT_TOPIC);
            topic = Some(DEFAULT_TOPIC.to_string());
        }

        let client_id = non_empty(file.client_id)
            .or_else(|| self.env_value("kafka.client_id"))
            .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string());

        let write_timeout_ms = match file.write_timeout_ms {
            Some(ms) => Some(ms),
            None => match self.env_value("kafka.write_timeout_ms") {
                Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue {
                        key: "kafka.write_timeout_ms",
                        value: raw.clone(),
                    }
                })?),
                None => None,
            },
        };
        // The write timeout must be non-zero.
        let write_timeout = match write_timeout_ms {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: "kafka.write_timeout_ms",
                    value: "0".to_string(),
                })
            }
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_WRITE_TIMEOUT,
        };

        let connection = match file.connection {
            Some(mode) => mode,
            None => match self.env_value("kafka.connection") {
                Some(raw) => raw.parse().map_err(|value| ConfigError::InvalidValue {
                    key: "kafka.connection",
                    value,
                })?,
                None => ConnectionMode::default(),
            },
        };

        let settings = Settings {
            kafka: KafkaSettings {
                brokers,
                topic: topic.unwrap_or_default(),
                client_id,
                write_timeout,
                connection,
            },
        };

        info!("kafka brokers: {:?}", settings.kafka.brokers);
        info!("kafka topic: {}", settings.kafka.topic);
        Ok(settings)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths.iter().find_map(|dir| {
            CONFIG_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{CONFIG_NAME}.{ext}")))
                .find(|candidate| candidate.is_file())
        })
    }

    fn env_value(&self, key: &str) -> Option<String> {
        non_empty((self.env)(&env_key(key)))
    }

    fn require(&self, key: &'static str) -> Result<(), ConfigError> {
        if self.strict {
            return Err(ConfigError::Missing {
                key,
                env: env_key(key),
            });
        }
        Ok(())
    }
}

/// `kafka.brokers` -> `KAFKA_BROKERS`
pub fn env_key(key: &str) -> String {
    key.replace('.', "_").to_ascii_uppercase()
}

fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn clean_brokers<I: IntoIterator<Item = String>>(raw: I) -> Vec<String> {
    raw.into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
