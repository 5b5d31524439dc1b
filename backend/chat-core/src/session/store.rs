//! The mirrored session model.
//!
//! Only the dispatcher mutates the store (the mutators are crate-private).
//! Everything outside the crate sees it read-only, through
//! [`Dispatcher::store`](crate::dispatcher::Dispatcher::store).

use crate::session::channel::Channel;

use models::{ChannelOptions, Identity, Request};

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    identity: Option<Identity>,
    channels: HashMap<Uuid, Channel>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Our own identity, once the server has accepted the login.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_self(&self, id: &Uuid) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| identity.id == *id)
    }

    pub fn channel(&self, id: &Uuid) -> Option<&Channel> {
        self.channels.get(id)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Ids of every open channel, sorted for stable output.
    pub fn channel_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.channels.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Requests needed to move `channel` to the given settings.
    ///
    /// A `Topic` request is produced only when the topic differs, and a
    /// `SetChannelModes` request only when `options` differs from what the
    /// stored mode descriptors read as. Unknown channels produce nothing.
    pub fn settings_requests(
        &self,
        channel: &Uuid,
        topic: &str,
        options: ChannelOptions,
    ) -> Vec<Request> {
        let Some(current) = self.channels.get(channel) else {
            warn!("Settings update for unknown channel {channel}");
            return Vec::new();
        };

        let mut requests = Vec::new();

        if current.topic() != topic {
            requests.push(Request::topic(*channel, topic));
        }

        if current.options() != options {
            requests.push(Request::set_channel_modes(*channel, options.to_wire()));
        }

        requests
    }

    /// Returns `false` (and keeps the first identity) if already set.
    pub(crate) fn set_self_identity(&mut self, identity: Identity) -> bool {
        if let Some(ref existing) = self.identity {
            warn!(
                "Ignoring second identity {} ({}); session is already {} ({})",
                identity.name, identity.id, existing.name, existing.id
            );
            return false;
        }

        debug!("Session identity set: {} ({})", identity.name, identity.id);
        self.identity = Some(identity);
        true
    }

    /// Create a channel with ourselves as the only member.
    ///
    /// Returns `false` without touching anything when there is no identity
    /// yet. Creating a channel that already exists keeps it and makes sure
    /// we are in its roster.
    pub(crate) fn create_channel(&mut self, id: Uuid, name: impl Into<String>) -> bool {
        let Some(ref identity) = self.identity else {
            warn!("Cannot create channel {id} before authentication");
            return false;
        };

        if let Some(existing) = self.channels.get_mut(&id) {
            debug!("Rejoined channel {} ({id})", existing.name());
            existing.add_member(identity.clone());
            return true;
        }

        let channel = Channel::new(id, name, identity);
        debug!("Created channel {} ({id})", channel.name());
        self.channels.insert(id, channel);
        true
    }

    pub(crate) fn destroy_channel(&mut self, id: &Uuid) -> Option<Channel> {
        let removed = self.channels.remove(id);
        if let Some(ref channel) = removed {
            debug!(
                "Destroyed channel {} ({id}) with {} members",
                channel.name(),
                channel.member_count()
            );
        }
        removed
    }

    /// Returns `true` only if the member was newly added.
    pub(crate) fn add_member(&mut self, channel: &Uuid, member: Identity) -> bool {
        self.channels
            .get_mut(channel)
            .is_some_and(|c| c.add_member(member))
    }

    /// Returns the removed member's stored name.
    pub(crate) fn remove_member(&mut self, channel: &Uuid, member: &Uuid) -> Option<String> {
        self.channels
            .get_mut(channel)
            .and_then(|c| c.remove_member(member))
    }

    pub(crate) fn set_topic(&mut self, channel: &Uuid, topic: impl Into<String>) -> bool {
        match self.channels.get_mut(channel) {
            Some(c) => {
                c.set_topic(topic);
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_modes(&mut self, channel: &Uuid, modes: BTreeSet<String>) -> bool {
        match self.channels.get_mut(channel) {
            Some(c) => {
                c.set_modes(modes);
                true
            }
            None => false,
        }
    }

    /// Forget everything: identity and all channels.
    pub(crate) fn reset(&mut self) {
        self.identity = None;
        self.channels.clear();
    }
}
