//! Login credentials and the auth frame they produce.

pub mod builder;

use crate::Request;

use common::RedactedSecret;

/// How a session authenticates right after the socket opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Anonymous login; the server picks a name when none is given.
    Guest { nickname: Option<String> },
    /// Operator login checked against the server's account store.
    Agent {
        nickname: String,
        username: String,
        password: RedactedSecret,
    },
}

impl Credentials {
    pub fn guest(nickname: Option<String>) -> Self {
        Self::Guest { nickname }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent { .. })
    }

    /// The `AuthGuest` / `AuthAgent` frame sent on connect.
    pub fn to_request(&self) -> Request {
        match self {
            Self::Guest { nickname } => Request::auth_guest(nickname.clone()),
            Self::Agent {
                nickname,
                username,
                password,
            } => Request::auth_agent(nickname.clone(), username.clone(), password.clone()),
        }
    }
}
