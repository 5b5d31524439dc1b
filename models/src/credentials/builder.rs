use crate::Credentials;
use crate::error::model_error::ModelError;

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;

/// Builder for validated [`Credentials`].
///
/// Blank strings are treated as absent, so form-style input can be passed
/// straight through.
#[derive(Debug, Default)]
pub struct CredentialsBuilder {
    guest: Option<bool>,
    nickname: Option<String>,
    username: Option<String>,
    password: Option<RedactedSecret>,
}

impl CredentialsBuilder {
    pub fn with_guest(mut self, guest: bool) -> Self {
        self.guest = Some(guest);
        self
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: RedactedSecret) -> Self {
        self.password = Some(password);
        self
    }

    /// Build the credentials with validation.
    #[track_caller]
    pub fn build(self) -> Result<Credentials, ModelError> {
        let guest = self.guest.ok_or_else(|| ModelError::Validation {
            message: String::from("Login mode is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let nickname = non_blank(self.nickname);

        if guest {
            return Ok(Credentials::Guest { nickname });
        }

        let username = non_blank(self.username).ok_or_else(|| ModelError::Validation {
            message: String::from("Username is required for agent login"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let password = self.password.ok_or_else(|| ModelError::Validation {
            message: String::from("Password is required for agent login"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if password.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Password cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Credentials::Agent {
            nickname: nickname.unwrap_or_else(|| username.clone()),
            username,
            password,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
