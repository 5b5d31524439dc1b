//! Session state: the mirrored model plus ephemeral per-session tables.

pub mod channel;
pub mod pending_modes;
pub mod store;
pub mod typing;

pub use channel::Channel;
pub use pending_modes::PendingModes;
pub use store::SessionStore;
pub use typing::TypingThrottle;

use std::time::Duration;

/// Everything the dispatcher owns for one connection.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub(crate) store: SessionStore,
    pub(crate) typing: TypingThrottle,
    pub(crate) pending_modes: PendingModes,
}

impl SessionContext {
    pub fn new(typing_cooldown: Duration, modes_settle: Duration) -> Self {
        Self {
            store: SessionStore::new(),
            typing: TypingThrottle::new(typing_cooldown),
            pending_modes: PendingModes::new(modes_settle),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn typing(&self) -> &TypingThrottle {
        &self.typing
    }

    pub fn pending_modes(&self) -> &PendingModes {
        &self.pending_modes
    }

    pub(crate) fn reset(&mut self) {
        self.store.reset();
        self.typing.clear();
        self.pending_modes.clear();
    }
}
