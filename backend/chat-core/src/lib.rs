//! Session engine for the ichat protocol.
//!
//! The pieces, leaves first:
//!
//! - [`event_bus`]: typed publish/subscribe for everything the engine reports
//! - [`session`]: the mirrored channel/roster model and ephemeral typing table
//! - [`command`]: user command text to validated [`models::Request`]s
//! - [`dispatcher`]: applies inbound frames to the session and publishes events
//! - [`connection`]: socket lifecycle, auth on connect, the session task
//!
//! A caller builds a [`ChatClient`], subscribes to the topics it cares about,
//! connects, and talks to the running session through a [`SessionHandle`].

pub mod command;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod event_bus;
pub mod session;

pub use config::ClientConfig;
pub use connection::{ChatClient, ConnectFailure, SessionHandle};
pub use event_bus::{ClientEvent, EventBus, Topic};

#[cfg(test)]
mod tests;

pub const DEFAULT_SERVER_HOSTNAME: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 1300;
pub const DEFAULT_SERVER_URL: &str = const_format::concatcp!(
    "wss://",
    DEFAULT_SERVER_HOSTNAME,
    ":",
    DEFAULT_SERVER_PORT,
    "/"
);
