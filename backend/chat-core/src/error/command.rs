use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CommandError {
    /// Malformed input; `title` is a short heading for a notice.
    #[error("Validation Error: {title}: {message} {location}")]
    Validation {
        title: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Unsupported Command: {command} {location}")]
    Unsupported {
        command: String,
        location: ErrorLocation,
    },
}
