//! Wire frames.
//!
//! Both directions share one JSON envelope; the `type` field is an
//! externally tagged enum, so `{"Join": ["lounge", "0.0.0.0"]}` maps onto
//! `RequestKind::Join` / `EventKind::Join`.

use crate::{ChannelListing, NO_ADDRESS, ProblemCode, VOID_ID};

use common::RedactedSecret;

use std::net::IpAddr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Id stamped on every outgoing frame.
///
/// The protocol has no request/reply correlation: the server never echoes
/// this value back, so every request carries the same constant.
pub const REQUEST_ID: u64 = 1;

/// A client-originated frame.
///
/// `source` is always [`VOID_ID`]; the server fills in the real sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub target: Uuid,
    pub source: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    AuthGuest(Option<String>),
    /// nickname, username, password
    AuthAgent(
        String,
        String,
        #[serde(serialize_with = "expose_secret", deserialize_with = "wrap_secret")]
        RedactedSecret,
    ),
    /// channel name, address (always [`NO_ADDRESS`] from a client)
    Join(String, IpAddr),
    /// user (void for self), channel, address
    Part(Uuid, Uuid, IpAddr),
    /// channel, user, reason
    Kick(Uuid, Uuid, String),
    /// user, reason
    Kill(Uuid, String),
    /// address, expiry in seconds, reason
    Kline(String, u64, String),
    Message(String),
    Pong(u64),
    Topic(String),
    SetChannelModes(u64),
    Channels,
    /// user (void for self), channel
    Typing(Uuid, Uuid),
}

fn expose_secret<S>(secret: &RedactedSecret, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.expose())
}

fn wrap_secret<'de, D>(deserializer: D) -> Result<RedactedSecret, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(RedactedSecret::new)
}

impl Request {
    pub fn new(kind: RequestKind, target: Uuid, message: impl Into<String>) -> Self {
        Self {
            id: REQUEST_ID,
            kind,
            target,
            source: VOID_ID,
            message: message.into(),
        }
    }

    pub fn auth_guest(nickname: Option<String>) -> Self {
        Self::new(RequestKind::AuthGuest(nickname), VOID_ID, "")
    }

    pub fn auth_agent(nickname: String, username: String, password: RedactedSecret) -> Self {
        Self::new(
            RequestKind::AuthAgent(nickname, username, password),
            VOID_ID,
            "",
        )
    }

    /// Join (or create) a channel by name.
    pub fn join_by_name(name: impl Into<String>) -> Self {
        Self::new(RequestKind::Join(name.into(), NO_ADDRESS), VOID_ID, "")
    }

    /// Join an existing channel by id.
    pub fn join_by_id(channel: Uuid) -> Self {
        Self::new(RequestKind::Join(String::new(), NO_ADDRESS), channel, "")
    }

    pub fn part(channel: Uuid) -> Self {
        Self::new(RequestKind::Part(VOID_ID, channel, NO_ADDRESS), channel, "")
    }

    pub fn kick(channel: Uuid, user: Uuid, reason: impl Into<String>) -> Self {
        Self::new(RequestKind::Kick(channel, user, reason.into()), channel, "")
    }

    pub fn kill(user: Uuid, reason: impl Into<String>) -> Self {
        Self::new(RequestKind::Kill(user, reason.into()), VOID_ID, "")
    }

    pub fn kline(address: impl Into<String>, expiry_secs: u64, reason: impl Into<String>) -> Self {
        Self::new(
            RequestKind::Kline(address.into(), expiry_secs, reason.into()),
            VOID_ID,
            "",
        )
    }

    pub fn message(channel: Uuid, text: impl Into<String>) -> Self {
        Self::new(RequestKind::Message(text.into()), channel, "")
    }

    pub fn pong(nonce: u64) -> Self {
        Self::new(RequestKind::Pong(nonce), VOID_ID, "")
    }

    pub fn topic(channel: Uuid, topic: impl Into<String>) -> Self {
        Self::new(RequestKind::Topic(topic.into()), channel, "")
    }

    pub fn set_channel_modes(channel: Uuid, bits: u64) -> Self {
        Self::new(RequestKind::SetChannelModes(bits), channel, "")
    }

    pub fn channels() -> Self {
        Self::new(RequestKind::Channels, VOID_ID, "")
    }

    pub fn typing(channel: Uuid) -> Self {
        Self::new(RequestKind::Typing(VOID_ID, channel), channel, "")
    }
}

/// A server-originated frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub source: Uuid,
    pub target: Uuid,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// assigned id, assigned name
    AuthOk(Uuid, String),
    /// member name, member address (or [`NO_ADDRESS`] when hidden)
    Join(String, IpAddr),
    /// user, channel, address
    Part(Uuid, Uuid, IpAddr),
    /// channel, user, reason
    Kick(Uuid, Uuid, String),
    Quit(String),
    Message(String),
    /// user, channel
    Typing(Uuid, Uuid),
    Topic(String),
    ChannelModes(Option<Vec<String>>),
    UserList(Option<Vec<(Uuid, String)>>),
    ChannelList(Vec<ChannelListing>),
    Wallop(String),
    Problem(ProblemCode),
    Motd(String),
    Ping(u64),
}

impl EventKind {
    /// Tag name as it appears on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AuthOk(..) => "AuthOk",
            Self::Join(..) => "Join",
            Self::Part(..) => "Part",
            Self::Kick(..) => "Kick",
            Self::Quit(_) => "Quit",
            Self::Message(_) => "Message",
            Self::Typing(..) => "Typing",
            Self::Topic(_) => "Topic",
            Self::ChannelModes(_) => "ChannelModes",
            Self::UserList(_) => "UserList",
            Self::ChannelList(_) => "ChannelList",
            Self::Wallop(_) => "Wallop",
            Self::Problem(_) => "Problem",
            Self::Motd(_) => "Motd",
            Self::Ping(_) => "Ping",
        }
    }
}

impl Event {
    pub fn new(kind: EventKind, source: Uuid, target: Uuid, message: impl Into<String>) -> Self {
        Self {
            id: 0,
            kind,
            source,
            target,
            message: message.into(),
        }
    }
}
