//! Shared primitives for the ichat workspace.
//!
//! ## Architecture
//!
//! - **common** (this crate): error location tracking, secret handling
//! - **models**: wire frames and protocol data
//! - **chat-core**: session engine operating on models
//! - **ichat**: terminal front-end wiring everything together

pub mod error;
pub mod redacted_secret;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_secret::RedactedSecret;

#[cfg(test)]
mod tests;
