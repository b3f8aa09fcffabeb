use std::path::PathBuf;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "case-import-server", about = "Publishes case events to Kafka")]
pub struct Params {
    #[arg(long, env = "CASE_IMPORT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "CASE_IMPORT_PORT", default_value_t = 8888)]
    pub port: u16,

    /// Directories searched, in order, for config.yaml (default: ./conf, .)
    #[arg(long = "config-path", env = "CASE_IMPORT_CONFIG_PATH", value_delimiter = ',')]
    pub config_paths: Vec<PathBuf>,

    /// Fail at startup instead of defaulting the broker list or topic
    #[arg(long, env = "CASE_IMPORT_STRICT_CONFIG", default_value_t = false)]
    pub strict_config: bool,

    #[arg(long, env = "CASE_IMPORT_LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,
}

impl Params {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
