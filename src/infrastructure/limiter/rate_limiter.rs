use std::{sync::Arc, time::Duration};

use sha2::{Digest, Sha256};

use crate::constants::RATE_LIMIT_KEY_PREFIX;

use super::store::CounterStore;

/// Fixed window limiter over an external counter store.
///
/// The window is anchored to the first request seen for a key and resets
/// completely once the key expires. Without a store, or whenever the store
/// fails, every request is allowed.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    store: Option<Arc<dyn CounterStore>>,
    max_requests: u64,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(store: Option<Arc<dyn CounterStore>>, max_requests: u64, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, 0, Duration::ZERO)
    }

    pub fn store(&self) -> Option<&Arc<dyn CounterStore>> {
        self.store.as_ref()
    }

    /// Counts one request from `client_ip` and reports whether it may proceed.
    pub async fn is_allowed(&self, client_ip: Option<&str>) -> bool {
        let Some(store) = &self.store else {
            return true;
        };
        let Some(ip) = client_ip.filter(|ip| !ip.is_empty()) else {
            tracing::debug!("No client address; skipping rate limit");
            return true;
        };

        let key = rate_limit_key(ip);

        let count = match store.incr(&key).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(%key, "Rate limit check failed open: {}", e);
                return true;
            }
        };

        if count == 1 {
            if let Err(e) = store.expire(&key, self.window).await {
                tracing::warn!(%key, "Failed to set rate limit window: {}", e);
            }
        }

        if count > self.max_requests {
            tracing::debug!(%key, count, "Rate limit exceeded");
            return false;
        }
        true
    }
}

/// Store key for a client address; the address itself is never stored.
pub fn rate_limit_key(ip: &str) -> String {
    let digest = Sha256::digest(ip.as_bytes());
    format!("{}:{}", RATE_LIMIT_KEY_PREFIX, hex::encode(digest))
}
