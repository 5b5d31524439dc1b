//! Inbound frame handling.
//!
//! [`Dispatcher::dispatch`] applies one server [`Event`] to the session and
//! publishes what happened. Frames about channels or members we don't know
//! are logged and dropped: the server can legitimately race us (a roster
//! arriving before our own join, a part for someone we never saw).

use crate::config::ClientConfig;
use crate::event_bus::{ClientEvent, ErrorKind, EventBus};
use crate::session::{SessionContext, SessionStore};

use models::{
    ChannelListing, ChannelOptions, Event, EventKind, Identity, ProblemCode, Request,
    is_no_address,
};

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use log::{debug, error, info, trace, warn};
use uuid::Uuid;

#[derive(Debug)]
pub struct Dispatcher {
    context: SessionContext,
    bus: EventBus,
    typing_display: Duration,
    modes_settle: Duration,
}

impl Dispatcher {
    pub fn new(bus: EventBus, config: &ClientConfig) -> Self {
        Self {
            context: SessionContext::new(config.typing_cooldown(), config.modes_settle()),
            bus,
            typing_display: config.typing_display(),
            modes_settle: config.modes_settle(),
        }
    }

    pub fn store(&self) -> &SessionStore {
        self.context.store()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Give the bus (and its subscriptions) back, e.g. to reconnect.
    pub fn into_bus(self) -> EventBus {
        self.bus
    }

    /// Publish `event`. A failing handler is logged, never propagated.
    pub fn emit(&mut self, event: ClientEvent) {
        if let Err(e) = self.bus.publish(&event) {
            error!("Subscriber failed on {}: {}", event.topic(), e);
        }
    }

    /// Apply one inbound frame.
    ///
    /// # Returns
    ///
    /// Requests that must be sent right away in reply (only `Pong` today).
    pub fn dispatch(&mut self, event: Event) -> Vec<Request> {
        trace!("Dispatching {} from {} to {}", event.kind.tag(), event.source, event.target);

        let Event {
            kind,
            source,
            target,
            message,
            ..
        } = event;

        match kind {
            EventKind::AuthOk(id, name) => self.on_auth_ok(Identity::new(id, name)),
            EventKind::Join(username, ip) => self.on_join(source, target, username, ip, message),
            EventKind::Part(user, _, _) => self.on_part(user, target, message),
            EventKind::Kick(channel, user, reason) => self.on_kick(channel, user, reason, message),
            EventKind::Quit(reason) => self.on_quit(source, target, reason, message),
            EventKind::Message(text) => self.on_message(source, target, text, message),
            EventKind::Typing(user, channel) => self.on_typing(user, channel),
            EventKind::Topic(topic) => self.on_topic(target, topic),
            EventKind::ChannelModes(modes) => self.on_channel_modes(target, modes.unwrap_or_default()),
            EventKind::UserList(members) => self.on_user_list(target, members.unwrap_or_default()),
            EventKind::ChannelList(channels) => self.on_channel_list(channels),
            EventKind::Wallop(text) => self.on_wallop(text),
            EventKind::Problem(code) => self.on_problem(code, message),
            EventKind::Motd(text) => self.emit(ClientEvent::WelcomeNotice {
                title: message,
                text,
            }),
            EventKind::Ping(nonce) => {
                trace!("Ping {nonce}, replying");
                return vec![Request::pong(nonce)];
            }
        }

        Vec::new()
    }

    /// Report a frame that could not be decoded.
    pub fn report_decode_error(&mut self, text: impl Into<String>) {
        self.emit(ClientEvent::Error {
            kind: ErrorKind::Decode,
            text: text.into(),
        });
    }

    pub fn report_transport_error(&mut self, text: impl Into<String>) {
        self.emit(ClientEvent::Error {
            kind: ErrorKind::Transport,
            text: text.into(),
        });
    }

    /// Wipe the session and announce the disconnect.
    pub fn disconnect(&mut self, reason: Option<String>) {
        info!(
            "Session closed, dropping {} channels",
            self.context.store().channel_count()
        );
        self.context.reset();
        self.emit(ClientEvent::Disconnect { reason });
    }

    /// A `Typing` request for `channel`, unless one went out within the cool-down.
    pub fn typing_request(&mut self, channel: Uuid, now: Instant) -> Option<Request> {
        if self.context.store().channel(&channel).is_none() {
            debug!("Not sending typing for unknown channel {channel}");
            return None;
        }

        self.context
            .typing
            .try_begin(channel, now)
            .then(|| Request::typing(channel))
    }

    pub fn settings_requests(
        &self,
        channel: &Uuid,
        topic: &str,
        options: ChannelOptions,
    ) -> Vec<Request> {
        self.context.store().settings_requests(channel, topic, options)
    }

    fn on_auth_ok(&mut self, identity: Identity) {
        if self.context.store.set_self_identity(identity.clone()) {
            info!("Authenticated as {} ({})", identity.name, identity.id);
            self.emit(ClientEvent::Authenticated { identity });
        }
    }

    fn on_join(&mut self, source: Uuid, channel: Uuid, username: String, ip: IpAddr, message: String) {
        let store = &mut self.context.store;

        if store.is_self(&source) {
            if !store.create_channel(channel, message) {
                return;
            }
            let name = store
                .channel(&channel)
                .map(|c| c.name().to_string())
                .unwrap_or_default();
            info!("Joined {name} ({channel})");
            self.emit(ClientEvent::ChannelJoined { channel, name });

            // Modes for a channel we join arrive ahead of the join itself.
            if let Some(modes) = self.context.pending_modes.take(&channel, Instant::now()) {
                debug!("Applying {} held modes to {channel}", modes.len());
                self.apply_modes(channel, modes);
            }
            return;
        }

        if store.channel(&channel).is_none() {
            warn!("Join from {username} ({source}) for unknown channel {channel}");
            return;
        }

        let member = Identity::new(source, username);
        if !store.add_member(&channel, member.clone()) {
            debug!("{} ({source}) already in {channel}", member.name);
            return;
        }

        let ip = (!is_no_address(&ip)).then_some(ip);
        self.emit(ClientEvent::MemberJoined {
            channel,
            member,
            ip,
        });
    }

    fn on_part(&mut self, user: Uuid, channel: Uuid, message: String) {
        let store = &mut self.context.store;

        if store.is_self(&user) {
            match store.destroy_channel(&channel) {
                Some(left) => {
                    info!("Left {} ({channel})", left.name());
                    self.emit(ClientEvent::ChannelLeft {
                        channel,
                        name: left.name().to_string(),
                    });
                }
                None => warn!("Part for unknown channel {channel}"),
            }
            return;
        }

        if store.channel(&channel).is_none() {
            warn!("Part from {user} for unknown channel {channel}");
            return;
        }

        match store.remove_member(&channel, &user) {
            Some(stored) => {
                let member = Identity::new(user, display_name(message, stored));
                self.emit(ClientEvent::MemberLeft { channel, member });
            }
            None => warn!("Part from {user} who is not in {channel}"),
        }
    }

    fn on_kick(&mut self, channel: Uuid, user: Uuid, reason: String, message: String) {
        let store = &mut self.context.store;

        if store.is_self(&user) {
            match store.destroy_channel(&channel) {
                Some(kicked) => {
                    info!("Kicked from {} ({channel}): {reason}", kicked.name());
                    self.emit(ClientEvent::KickedFromChannel {
                        channel,
                        name: kicked.name().to_string(),
                        reason,
                    });
                }
                None => warn!("Kick from unknown channel {channel}"),
            }
            return;
        }

        if store.channel(&channel).is_none() {
            warn!("Kick of {user} in unknown channel {channel}");
            return;
        }

        match store.remove_member(&channel, &user) {
            Some(stored) => {
                let member = Identity::new(user, display_name(message, stored));
                self.emit(ClientEvent::MemberKicked {
                    channel,
                    member,
                    reason,
                });
            }
            None => warn!("Kick of {user} who is not in {channel}"),
        }
    }

    fn on_quit(&mut self, user: Uuid, channel: Uuid, reason: String, message: String) {
        let store = &mut self.context.store;

        if store.channel(&channel).is_none() {
            warn!("Quit from {user} for unknown channel {channel}");
            return;
        }

        match store.remove_member(&channel, &user) {
            Some(stored) => {
                let member = Identity::new(user, display_name(message, stored));
                self.emit(ClientEvent::MemberDisconnected {
                    channel,
                    member,
                    reason,
                });
            }
            None => warn!("Quit from {user} who is not in {channel}"),
        }
    }

    fn on_message(&mut self, sender: Uuid, channel: Uuid, text: String, message: String) {
        let store = self.context.store();

        // Our own messages were shown when we sent them.
        if store.is_self(&sender) {
            return;
        }

        let Some(known) = store.channel(&channel) else {
            warn!("Message from {sender} for unknown channel {channel}");
            return;
        };

        let stored = known.member_name(&sender).unwrap_or_default().to_string();
        let sender = Identity::new(sender, display_name(message, stored));
        self.emit(ClientEvent::MessageReceived {
            channel,
            sender,
            text,
        });
    }

    fn on_typing(&mut self, user: Uuid, channel: Uuid) {
        let store = self.context.store();

        if store.is_self(&user) {
            return;
        }

        let Some(known) = store.channel(&channel) else {
            debug!("Typing from {user} for unknown channel {channel}");
            return;
        };

        let Some(member) = known.member(&user) else {
            debug!("Typing from {user} who is not in {channel}");
            return;
        };

        let display_for = self.typing_display;
        self.emit(ClientEvent::MemberTyping {
            channel,
            member,
            display_for,
        });
    }

    fn on_topic(&mut self, channel: Uuid, topic: String) {
        if !self.context.store.set_topic(&channel, topic.clone()) {
            warn!("Topic for unknown channel {channel}");
            return;
        }
        self.emit(ClientEvent::TopicChanged { channel, topic });
    }

    fn on_channel_modes(&mut self, channel: Uuid, modes: Vec<String>) {
        let modes: BTreeSet<String> = modes.into_iter().collect();

        if self.context.store().channel(&channel).is_none() {
            debug!("Holding modes for {channel} until we join it");
            self.context
                .pending_modes
                .hold(channel, modes, Instant::now());
            return;
        }

        self.apply_modes(channel, modes);
    }

    fn apply_modes(&mut self, channel: Uuid, modes: BTreeSet<String>) {
        if !self.context.store.set_modes(&channel, modes.clone()) {
            warn!("Modes for unknown channel {channel}");
            return;
        }

        let settle = self.modes_settle;
        self.emit(ClientEvent::ModesChanged {
            channel,
            modes,
            settle,
        });
    }

    fn on_user_list(&mut self, channel: Uuid, members: Vec<(Uuid, String)>) {
        let store = &mut self.context.store;

        if store.channel(&channel).is_none() {
            warn!("User list for unknown channel {channel}");
            return;
        }

        let mut added = Vec::new();
        for (id, name) in members {
            if store.is_self(&id) {
                continue;
            }
            let member = Identity::new(id, name);
            if store.add_member(&channel, member.clone()) {
                added.push(member);
            }
        }

        let roster_size = store
            .channel(&channel)
            .map_or(0, |c| c.member_count());

        debug!("User list for {channel}: {} new, {roster_size} total", added.len());
        self.emit(ClientEvent::RosterBulkUpdated {
            channel,
            added,
            roster_size,
        });
    }

    fn on_channel_list(&mut self, channels: Vec<ChannelListing>) {
        debug!("Channel directory with {} entries", channels.len());
        self.emit(ClientEvent::ChannelDirectory { channels });
    }

    fn on_wallop(&mut self, text: String) {
        let channels = self.context.store().channel_ids();
        self.emit(ClientEvent::OperatorNotice { channels, text });
    }

    fn on_problem(&mut self, code: ProblemCode, text: String) {
        warn!("Server problem {code:?}: {text}");
        self.emit(ClientEvent::Error {
            kind: ErrorKind::Problem(code),
            text,
        });
    }
}

/// Prefer the name the frame carries; fall back to what the roster had.
fn display_name(frame_name: String, stored: String) -> String {
    if frame_name.is_empty() {
        stored
    } else {
        frame_name
    }
}
