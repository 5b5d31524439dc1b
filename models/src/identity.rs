//! Identities and the reserved sentinels.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The all-zero id: "no channel" or "no user".
pub const VOID_ID: Uuid = Uuid::nil();

/// The address the server substitutes when a member's ip is hidden from us.
pub const NO_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

pub fn is_void(id: &Uuid) -> bool {
    id.is_nil()
}

pub fn is_no_address(ip: &IpAddr) -> bool {
    *ip == NO_ADDRESS
}

/// A user as the server names them: opaque id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
}

impl Identity {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
