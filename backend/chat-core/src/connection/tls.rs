//! TLS setup for `wss://` urls.

use std::sync::Once;

use log::debug;

static INSTALL_PROVIDER_ONCE: Once = Once::new();

/// Install `ring` as the process-wide rustls crypto provider.
///
/// A provider the embedding application installed first is kept.
pub(crate) fn install_crypto_provider() {
    INSTALL_PROVIDER_ONCE.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }
    });
}
