use models::{ChannelOptions, Identity};

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

/// A channel we are a member of, as mirrored from server events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    id: Uuid,
    name: String,
    topic: String,
    modes: BTreeSet<String>,
    roster: HashMap<Uuid, String>,
}

impl Channel {
    pub(crate) fn new(id: Uuid, name: impl Into<String>, founder: &Identity) -> Self {
        let mut roster = HashMap::new();
        roster.insert(founder.id, founder.name.clone());

        Self {
            id,
            name: name.into(),
            topic: String::new(),
            modes: BTreeSet::new(),
            roster,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Mode descriptors exactly as the server last reported them.
    pub fn modes(&self) -> &BTreeSet<String> {
        &self.modes
    }

    /// Best-effort reading of [`Channel::modes`] as option flags.
    pub fn options(&self) -> ChannelOptions {
        ChannelOptions::from_descriptors(&self.modes)
    }

    pub fn roster(&self) -> &HashMap<Uuid, String> {
        &self.roster
    }

    pub fn member_count(&self) -> usize {
        self.roster.len()
    }

    pub fn contains(&self, member: &Uuid) -> bool {
        self.roster.contains_key(member)
    }

    pub fn member_name(&self, member: &Uuid) -> Option<&str> {
        self.roster.get(member).map(String::as_str)
    }

    pub fn member(&self, member: &Uuid) -> Option<Identity> {
        self.member_name(member)
            .map(|name| Identity::new(*member, name))
    }

    /// Returns `false` if the id was already present; the stored name is kept.
    pub(crate) fn add_member(&mut self, member: Identity) -> bool {
        if self.roster.contains_key(&member.id) {
            return false;
        }
        self.roster.insert(member.id, member.name);
        true
    }

    pub(crate) fn remove_member(&mut self, member: &Uuid) -> Option<String> {
        self.roster.remove(member)
    }

    pub(crate) fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub(crate) fn set_modes(&mut self, modes: BTreeSet<String>) {
        self.modes = modes;
    }
}
