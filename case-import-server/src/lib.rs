pub mod config;
pub mod handler;
pub mod publisher;
pub mod server;
mod types;

pub use config::{ConfigError, ConfigResolver, ConnectionMode, KafkaSettings, Settings};
pub use handler::{EventHandler, HandlerError};
pub use types::SharedHandler;
