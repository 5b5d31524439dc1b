use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of a `ChannelList` reply.
///
/// On the wire each row is a positional array
/// `[id, name, topic, member_count, mode_bits]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(Uuid, String, String, u64, u64)",
    into = "(Uuid, String, String, u64, u64)"
)]
pub struct ChannelListing {
    pub id: Uuid,
    pub name: String,
    pub topic: String,
    pub member_count: u64,
    pub mode_bits: u64,
}

impl From<(Uuid, String, String, u64, u64)> for ChannelListing {
    fn from((id, name, topic, member_count, mode_bits): (Uuid, String, String, u64, u64)) -> Self {
        Self {
            id,
            name,
            topic,
            member_count,
            mode_bits,
        }
    }
}

impl From<ChannelListing> for (Uuid, String, String, u64, u64) {
    fn from(row: ChannelListing) -> Self {
        (row.id, row.name, row.topic, row.member_count, row.mode_bits)
    }
}
