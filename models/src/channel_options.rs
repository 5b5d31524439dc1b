//! Channel mode flags.
//!
//! The protocol is asymmetric here: a client *sets* modes with a packed
//! `u64` (`SetChannelModes`), while the server *reports* them as a list of
//! descriptor strings (`ChannelModes`). The bitset is the outgoing encoding;
//! the descriptor mapping below is only a best-effort reading of the inbound
//! side and is not guaranteed to cover whatever the server chooses to send.

use bitflags::bitflags;

bitflags! {
    /// Outgoing channel options as packed on the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChannelOptions: u64 {
        /// Members may invite others.
        const CLIENT_INVITES     = 1 << 0;
        /// Only agents can join.
        const AGENT_ONLY         = 1 << 1;
        /// Only the creator or admins can bring people in.
        const INVITE_ONLY        = 1 << 2;
        /// Keep history once the channel empties.
        const SAVE_HISTORY       = 1 << 3;
        /// Keep the channel alive with zero members.
        const PERSIST            = 1 << 4;
        /// Reserved by the server; not exposed as a user setting.
        const WAIT_FOR_AGENT     = 1 << 5;
        /// Rejoin disconnected members on reconnect.
        const REJOIN_CLIENTS     = 1 << 6;
        /// Members may not leave.
        const CAN_NOT_LEAVE      = 1 << 7;
        /// Member list hidden from non-agents.
        const HIDDEN_MEMBER_LIST = 1 << 8;
        /// Messages hidden from non-agents.
        const HIDDEN_MESSAGES    = 1 << 9;
        /// Channel not shown as active to non-agents.
        const INVISIBLE          = 1 << 10;
        /// Channel not listed to non-agents.
        const SECRET             = 1 << 11;
    }
}

const DESCRIPTORS: [(ChannelOptions, &str); 12] = [
    (ChannelOptions::CLIENT_INVITES, "Allow Invites"),
    (ChannelOptions::AGENT_ONLY, "Agent Only"),
    (ChannelOptions::INVITE_ONLY, "Invite Only"),
    (ChannelOptions::SAVE_HISTORY, "Save History"),
    (ChannelOptions::PERSIST, "Persist Empty"),
    (ChannelOptions::WAIT_FOR_AGENT, "Wait for Agent"),
    (ChannelOptions::REJOIN_CLIENTS, "Rejoin on Disconnect"),
    (ChannelOptions::CAN_NOT_LEAVE, "May Not Leave"),
    (ChannelOptions::HIDDEN_MEMBER_LIST, "Hidden Members"),
    (ChannelOptions::HIDDEN_MESSAGES, "Hidden Messages"),
    (ChannelOptions::INVISIBLE, "Invisible"),
    (ChannelOptions::SECRET, "Not Listed"),
];

impl ChannelOptions {
    /// Decode a `SetChannelModes` payload. Unknown bits are dropped.
    pub fn from_wire(bits: u64) -> Self {
        Self::from_bits_truncate(bits)
    }

    /// Encode for a `SetChannelModes` payload.
    pub fn to_wire(self) -> u64 {
        self.bits()
    }

    /// The options a settings form offers, in display order.
    pub fn selectable() -> impl Iterator<Item = ChannelOptions> {
        DESCRIPTORS
            .iter()
            .map(|(flag, _)| *flag)
            .filter(|flag| *flag != Self::WAIT_FOR_AGENT)
    }

    /// The server's descriptor for a single flag.
    pub fn descriptor(self) -> Option<&'static str> {
        DESCRIPTORS
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, text)| *text)
    }

    /// Read the flags a descriptor list appears to describe.
    ///
    /// Strings that match no known descriptor are ignored. This is used to
    /// prefill settings and to decide whether a `SetChannelModes` is needed;
    /// it is not the stored mode snapshot.
    pub fn from_descriptors<I, S>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        descriptors
            .into_iter()
            .filter_map(|text| {
                DESCRIPTORS
                    .iter()
                    .find(|(_, known)| *known == text.as_ref())
                    .map(|(flag, _)| *flag)
            })
            .fold(Self::empty(), |acc, flag| acc | flag)
    }
}
