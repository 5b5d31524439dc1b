//! Wire-level data for the ichat protocol.
//!
//! This crate contains pure data structures: the JSON frames exchanged with
//! the chat server, the identities they reference, and the channel option
//! encodings. There is no I/O and no session logic here - that lives in
//! `chat-core`.
//!
//! ## Frames
//!
//! Every frame on the wire has the same envelope in both directions:
//!
//! ```json
//! {"id": 1, "type": {"Join": ["lounge", "0.0.0.0"]}, "target": "<uuid>", "source": "<uuid>", "message": ""}
//! ```
//!
//! Outgoing frames are [`Request`]s, inbound frames are [`Event`]s. The two
//! directions use distinct tag enums ([`RequestKind`], [`EventKind`]) so that
//! every dispatch is an exhaustive `match`.

pub mod channel_listing;
pub mod channel_options;
pub mod credentials;
pub mod error;
pub mod frame;
pub mod identity;
pub mod problem;

pub use channel_listing::ChannelListing;
pub use channel_options::ChannelOptions;
pub use credentials::{Credentials, builder::CredentialsBuilder};
pub use error::model_error::ModelError;
pub use frame::{Event, EventKind, REQUEST_ID, Request, RequestKind};
pub use identity::{Identity, NO_ADDRESS, VOID_ID, is_no_address, is_void};
pub use problem::ProblemCode;

#[cfg(test)]
mod tests;
