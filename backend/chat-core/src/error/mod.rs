pub mod command;
pub mod config;
pub mod connection;
pub mod event_bus;

pub use command::CommandError;
pub use config::ConfigError;
pub use connection::ConnectionError;
pub use event_bus::EventBusError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Connection(#[from] connection::ConnectionError),

    #[error(transparent)]
    Command(#[from] command::CommandError),

    #[error(transparent)]
    EventBus(#[from] event_bus::EventBusError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
