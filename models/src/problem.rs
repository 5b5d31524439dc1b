use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::{Deserialize, Serialize};

/// Error category carried by a server `Problem` frame.
///
/// The human-readable detail travels in the frame's `message` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemCode {
    NameInUse,
    NameInvalid,
    InvalidAuth,
    InvalidArgument,
    NotAvailable,
    PermissionDenied,
    AlreadyMember,
    NotMember,
    ChannelNameBad,
    ChannelInvalid,
    KickedFromServer,
}

impl ProblemCode {
    /// Short heading suitable for a notice title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::NameInUse => "Name In Use",
            Self::NameInvalid => "Name Invalid",
            Self::InvalidAuth => "Invalid Authentication",
            Self::InvalidArgument => "Invalid Argument",
            Self::NotAvailable => "Not Available",
            Self::PermissionDenied => "Permission Denied",
            Self::AlreadyMember => "Already A Member",
            Self::NotMember => "Not A Member",
            Self::ChannelNameBad => "Bad Channel Name",
            Self::ChannelInvalid => "Invalid Channel",
            Self::KickedFromServer => "Kicked From Server",
        }
    }
}

impl Display for ProblemCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.title())
    }
}
