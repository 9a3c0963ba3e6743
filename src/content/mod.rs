//! Customer flavour text and tutor hints.

pub mod fallback;
pub mod remote;

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::config::simulation::SimulationConfig;
use crate::customers::OrderDraft;
pub use remote::{ProviderError, RemoteProvider};

pub enum ContentProvider {
    /// Ask a remote service first, fall back locally on any error.
    Remote(RemoteProvider),
    /// Local generator only.
    Offline,
}

impl ContentProvider {
    pub fn from_config(config: &SimulationConfig) -> Self {
        if config.content_endpoint.trim().is_empty() {
            return ContentProvider::Offline;
        }
        ContentProvider::Remote(RemoteProvider::new(
            config.content_endpoint.trim(),
            Duration::from_millis(config.content_timeout_ms),
        ))
    }

    pub fn name(&self) -> &str {
        match self {
            ContentProvider::Remote(_) => "remote",
            ContentProvider::Offline => "offline",
        }
    }

    /// An order for a shop at `level`. Never fails: provider errors are
    /// logged and answered by the local generator seeded with `rng_seed`.
    pub async fn customer_order(&self, level: u8, rng_seed: u64) -> OrderDraft {
        if let ContentProvider::Remote(remote) = self {
            match remote.customer_order(level).await {
                Ok(draft) => {
                    debug!(level, name = %draft.name, "Remote order received");
                    return draft;
                }
                Err(e) => {
                    warn!(endpoint = remote.endpoint(), error = %e, "Content provider failed, using fallback order");
                }
            }
        }
        fallback::customer_order(level, &mut ChaCha8Rng::seed_from_u64(rng_seed))
    }

    /// A short hint for `context`, with the same fallback rules as orders.
    pub async fn tutor_hint(&self, context: &str, rng_seed: u64) -> String {
        if let ContentProvider::Remote(remote) = self {
            match remote.tutor_hint(context).await {
                Ok(text) => return text,
                Err(e) => {
                    warn!(endpoint = remote.endpoint(), error = %e, "Content provider failed, using fallback hint");
                }
            }
        }
        fallback::tutor_hint(&mut ChaCha8Rng::seed_from_u64(rng_seed))
    }
}
