//! Typed publish/subscribe.
//!
//! Every event the engine reports is a [`ClientEvent`]; its [`Topic`] is
//! derived from the variant, so a payload can never be published on the
//! wrong topic. Delivery is synchronous and in subscription order. The first
//! handler that fails stops delivery of that event to later handlers, and
//! the failure is handed back to the publisher.

use crate::error::event_bus::EventBusError;

use common::ErrorLocation;
use models::{ChannelListing, Identity, ProblemCode};

use std::collections::{BTreeSet, HashMap};
use std::error::Error as StdError;
use std::fmt;
use std::net::IpAddr;
use std::panic::Location;
use std::time::Duration;

use log::trace;
use uuid::Uuid;

pub type HandlerResult = Result<(), Box<dyn StdError + Send + Sync>>;

type Handler = Box<dyn FnMut(&ClientEvent) -> HandlerResult + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Connect,
    Authenticated,
    ChannelJoined,
    MemberJoined,
    ChannelLeft,
    MemberLeft,
    KickedFromChannel,
    MemberKicked,
    MemberDisconnected,
    MessageReceived,
    MemberTyping,
    TopicChanged,
    ModesChanged,
    RosterBulkUpdated,
    ChannelDirectory,
    OperatorNotice,
    Error,
    WelcomeNotice,
    Disconnect,
}

impl Topic {
    pub const ALL: [Topic; 19] = [
        Topic::Connect,
        Topic::Authenticated,
        Topic::ChannelJoined,
        Topic::MemberJoined,
        Topic::ChannelLeft,
        Topic::MemberLeft,
        Topic::KickedFromChannel,
        Topic::MemberKicked,
        Topic::MemberDisconnected,
        Topic::MessageReceived,
        Topic::MemberTyping,
        Topic::TopicChanged,
        Topic::ModesChanged,
        Topic::RosterBulkUpdated,
        Topic::ChannelDirectory,
        Topic::OperatorNotice,
        Topic::Error,
        Topic::WelcomeNotice,
        Topic::Disconnect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Connect => "connect",
            Topic::Authenticated => "authenticated",
            Topic::ChannelJoined => "channel-joined",
            Topic::MemberJoined => "member-joined",
            Topic::ChannelLeft => "channel-left",
            Topic::MemberLeft => "member-left",
            Topic::KickedFromChannel => "kicked-from-channel",
            Topic::MemberKicked => "member-kicked",
            Topic::MemberDisconnected => "member-disconnected",
            Topic::MessageReceived => "message-received",
            Topic::MemberTyping => "member-typing",
            Topic::TopicChanged => "topic-changed",
            Topic::ModesChanged => "modes-changed",
            Topic::RosterBulkUpdated => "roster-bulk-updated",
            Topic::ChannelDirectory => "channel-directory",
            Topic::OperatorNotice => "operator-notice",
            Topic::Error => "error",
            Topic::WelcomeNotice => "welcome-notice",
            Topic::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong, for [`ClientEvent::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server rejected something we did.
    Problem(ProblemCode),
    /// A frame could not be decoded and was dropped.
    Decode,
    /// The socket reported an error.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Connect {
        url: String,
    },
    Authenticated {
        identity: Identity,
    },
    ChannelJoined {
        channel: Uuid,
        name: String,
    },
    MemberJoined {
        channel: Uuid,
        member: Identity,
        /// `None` when the server hides addresses from us.
        ip: Option<IpAddr>,
    },
    ChannelLeft {
        channel: Uuid,
        name: String,
    },
    MemberLeft {
        channel: Uuid,
        member: Identity,
    },
    KickedFromChannel {
        channel: Uuid,
        name: String,
        reason: String,
    },
    MemberKicked {
        channel: Uuid,
        member: Identity,
        reason: String,
    },
    MemberDisconnected {
        channel: Uuid,
        member: Identity,
        reason: String,
    },
    MessageReceived {
        channel: Uuid,
        sender: Identity,
        text: String,
    },
    MemberTyping {
        channel: Uuid,
        member: Identity,
        /// How long to show the indicator before clearing it.
        display_for: Duration,
    },
    TopicChanged {
        channel: Uuid,
        topic: String,
    },
    ModesChanged {
        channel: Uuid,
        modes: BTreeSet<String>,
        /// Delay before rendering; a join is followed closely by its modes.
        settle: Duration,
    },
    RosterBulkUpdated {
        channel: Uuid,
        added: Vec<Identity>,
        roster_size: usize,
    },
    ChannelDirectory {
        channels: Vec<ChannelListing>,
    },
    OperatorNotice {
        channels: Vec<Uuid>,
        text: String,
    },
    Error {
        kind: ErrorKind,
        text: String,
    },
    WelcomeNotice {
        title: String,
        text: String,
    },
    Disconnect {
        reason: Option<String>,
    },
}

impl ClientEvent {
    pub fn topic(&self) -> Topic {
        match self {
            ClientEvent::Connect { .. } => Topic::Connect,
            ClientEvent::Authenticated { .. } => Topic::Authenticated,
            ClientEvent::ChannelJoined { .. } => Topic::ChannelJoined,
            ClientEvent::MemberJoined { .. } => Topic::MemberJoined,
            ClientEvent::ChannelLeft { .. } => Topic::ChannelLeft,
            ClientEvent::MemberLeft { .. } => Topic::MemberLeft,
            ClientEvent::KickedFromChannel { .. } => Topic::KickedFromChannel,
            ClientEvent::MemberKicked { .. } => Topic::MemberKicked,
            ClientEvent::MemberDisconnected { .. } => Topic::MemberDisconnected,
            ClientEvent::MessageReceived { .. } => Topic::MessageReceived,
            ClientEvent::MemberTyping { .. } => Topic::MemberTyping,
            ClientEvent::TopicChanged { .. } => Topic::TopicChanged,
            ClientEvent::ModesChanged { .. } => Topic::ModesChanged,
            ClientEvent::RosterBulkUpdated { .. } => Topic::RosterBulkUpdated,
            ClientEvent::ChannelDirectory { .. } => Topic::ChannelDirectory,
            ClientEvent::OperatorNotice { .. } => Topic::OperatorNotice,
            ClientEvent::Error { .. } => Topic::Error,
            ClientEvent::WelcomeNotice { .. } => Topic::WelcomeNotice,
            ClientEvent::Disconnect { .. } => Topic::Disconnect,
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<Topic, Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`. Handlers run in registration order.
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F)
    where
        F: FnMut(&ClientEvent) -> HandlerResult + Send + 'static,
    {
        self.handlers
            .entry(topic)
            .or_default()
            .push(Box::new(handler));
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.handlers.get(&topic).map_or(0, Vec::len)
    }

    /// Deliver `event` to every handler of its topic.
    ///
    /// # Returns
    ///
    /// The number of handlers that ran successfully.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::Handler`] for the first failing handler;
    /// handlers after it are not called for this event.
    #[track_caller]
    pub fn publish(&mut self, event: &ClientEvent) -> Result<usize, EventBusError> {
        let topic = event.topic();
        let Some(handlers) = self.handlers.get_mut(&topic) else {
            trace!("No subscribers for {topic}");
            return Ok(0);
        };

        let total = handlers.len();
        for (delivered, handler) in handlers.iter_mut().enumerate() {
            if let Err(source) = handler(event) {
                return Err(EventBusError::Handler {
                    topic: topic.as_str(),
                    message: format!("handler {} of {total} failed: {source}", delivered + 1),
                    location: ErrorLocation::from(Location::caller()),
                    source,
                });
            }
        }

        Ok(total)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&'static str, usize> = self
            .handlers
            .iter()
            .map(|(topic, handlers)| (topic.as_str(), handlers.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}
