use std::sync::Arc;

use once_cell::sync::Lazy;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod telemetry;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, routes};
pub use infrastructure::{limiter, notifier, utils, web};

use limiter::{
    rate_limiter::FixedWindowLimiter,
    store::{CounterStore, MemoryCounterStore, RedisCounterStore},
};
use notifier::build_notifier;
use use_cases::contact::ContactHandler;

pub struct AppState {
    pub name: String,
    pub contact_handler: ContactHandler,
}

impl AppState {
    /// Wires the contact pipeline from configuration and pins the process
    /// start time. Must run inside a tokio runtime.
    pub fn new(config: &settings::AppConfig) -> Self {
        Lazy::force(&constants::START_TIME);

        let store = counter_store(config);
        match &store {
            Some(store) => tracing::info!(backend = store.backend(), "Contact rate limiting enabled"),
            None => tracing::warn!("No counter store configured; contact rate limiting is off"),
        }

        let rate_limiter = FixedWindowLimiter::new(
            store,
            config.rate_limit_max_requests,
            config.rate_limit_window(),
        );

        let notifier = build_notifier(config);
        match &notifier {
            Some(notifier) => tracing::info!(transport = notifier.transport(), "Contact email enabled"),
            None => tracing::warn!("No email transport configured; submissions will not be sent"),
        }

        AppState {
            name: config.name.clone(),
            contact_handler: ContactHandler::new(
                rate_limiter,
                notifier,
                config.contact_to_email.clone(),
            ),
        }
    }
}

fn counter_store(config: &settings::AppConfig) -> Option<Arc<dyn CounterStore>> {
    if let Some(url) = &config.redis_url {
        return RedisCounterStore::new(url, config.redis_token.as_deref())
            .map(|store| Arc::new(store) as Arc<dyn CounterStore>)
            .map_err(|e| tracing::error!("Redis counter store init failed: {}", e))
            .ok();
    }

    config
        .rate_limit_in_memory
        .then(|| Arc::new(MemoryCounterStore::new()) as Arc<dyn CounterStore>)
}
