//! Fixed client configuration
//!
//! None of these knobs are operator-configurable: the chat core runs with a
//! fixed windowing, retry, and freshness policy. The struct exists so that
//! the session and scheduler take one value instead of loose constants, and
//! so tests can tighten the window without patching globals.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::name::Name;

// ----------------------------------------------------------------------------
// Policy Constants
// ----------------------------------------------------------------------------

/// Scope name the sync substrate uses to exchange state among participants
pub const SYNC_SCOPE_URI: &str = "/ndn/broadcast/chronoSyncTest";

/// Routing prefix prepended to a username to form the routable publish name
pub const ROUTING_PREFIX_URI: &str = "/ndn/edu/colostate";

/// Maximum count of most-recent sequence numbers fetched per notified range
pub const FETCH_WINDOW: u64 = 10;

/// Fetch attempts the substrate makes per sequence number before giving up
pub const FETCH_RETRIES: u32 = 2;

/// How long a published item should stay servable to late-joining fetchers
pub const PUBLISH_FRESHNESS_MS: u64 = 4000;

/// Position of the username component in a routable publish name
///
/// `/ndn/edu/colostate/alice` puts the username at index 3. Holds only for
/// the three-component routing prefix above.
pub const SPEAKER_COMPONENT_INDEX: usize = 3;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Complete fixed configuration for one chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Broadcast scope for sync-state exchange
    pub sync_scope: Name,
    /// Routing prefix forming the head of every publish name
    pub routing_prefix: Name,
    /// Per-range fetch window
    pub window: u64,
    /// Retry budget per issued fetch
    pub retries: u32,
    /// Freshness hint attached to published items, in milliseconds
    pub freshness_ms: u64,
}

impl ChatConfig {
    /// Freshness hint as a duration
    pub fn freshness(&self) -> Duration {
        Duration::from_millis(self.freshness_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            // The fixed URIs are valid by construction
            sync_scope: Name::from_uri(SYNC_SCOPE_URI).unwrap_or_default(),
            routing_prefix: Name::from_uri(ROUTING_PREFIX_URI).unwrap_or_default(),
            window: FETCH_WINDOW,
            retries: FETCH_RETRIES,
            freshness_ms: PUBLISH_FRESHNESS_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_carries_fixed_policy() {
        let config = ChatConfig::default();
        assert_eq!(config.sync_scope.to_string(), SYNC_SCOPE_URI);
        assert_eq!(config.routing_prefix.to_string(), ROUTING_PREFIX_URI);
        assert_eq!(config.window, 10);
        assert_eq!(config.retries, 2);
        assert_eq!(config.freshness(), Duration::from_millis(4000));
    }
}
