use chat_core::ConnectFailure;
use chat_core::error::{CoreError, config::ConfigError, connection::ConnectionError};
use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors that end the ichat binary.
#[derive(Debug, Error)]
pub enum IchatError {
    /// Error from this App
    #[error("Ichat Error: {message} {location}")]
    Ichat {
        message: String,
        location: ErrorLocation,
    },

    /// Error from chat-core (config, connection, commands)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for IchatError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        IchatError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for IchatError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        IchatError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConnectionError> for IchatError {
    #[track_caller]
    fn from(error: ConnectionError) -> Self {
        IchatError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConnectFailure> for IchatError {
    #[track_caller]
    fn from(failure: ConnectFailure) -> Self {
        IchatError::from(failure.error)
    }
}
