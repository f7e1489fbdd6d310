use std::sync::Arc;

use crate::{
    entities::contact::{ContactEmail, ContactOutcome, ContactPayload, SuppressReason},
    errors::ContactError,
    limiter::rate_limiter::{rate_limit_key, FixedWindowLimiter},
    notifier::Notifier,
    use_cases::validation::{validate_payload, Validated},
};

/// Runs a contact submission through validation, rate limiting and delivery.
///
/// Each call is one synchronous pass; nothing is retried or kept.
pub struct ContactHandler {
    pub rate_limiter: FixedWindowLimiter,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub recipient: String,
}

impl ContactHandler {
    pub fn new(
        rate_limiter: FixedWindowLimiter,
        notifier: Option<Arc<dyn Notifier>>,
        recipient: String,
    ) -> Self {
        ContactHandler {
            rate_limiter,
            notifier,
            recipient,
        }
    }

    /// Handles a decoded payload from `client_ip`.
    pub async fn submit(
        &self,
        payload: ContactPayload,
        client_ip: Option<&str>,
    ) -> Result<ContactOutcome, ContactError> {
        let submission = match validate_payload(payload)? {
            Validated::Honeypot => {
                tracing::info!("Contact submission suppressed by honeypot");
                return Ok(ContactOutcome::Suppressed(SuppressReason::Honeypot));
            }
            Validated::Submission(submission) => submission,
        };

        if !self.rate_limiter.is_allowed(client_ip).await {
            let client = client_ip.map(rate_limit_key).unwrap_or_else(|| "unknown".into());
            tracing::warn!(%client, "Contact submission rate limited");
            return Err(ContactError::RateLimited);
        }

        let Some(notifier) = &self.notifier else {
            tracing::info!("Contact submission accepted; no email transport configured");
            return Ok(ContactOutcome::Suppressed(SuppressReason::NotConfigured));
        };

        let email = ContactEmail::compose(&submission, &self.recipient);

        match notifier.send(&email).await {
            Ok(()) => {
                tracing::info!(transport = notifier.transport(), "Contact email sent");
                Ok(ContactOutcome::Sent)
            }
            Err(e) => {
                tracing::warn!(transport = notifier.transport(), "Contact email failed: {}", e);
                Err(e.into())
            }
        }
    }

    pub fn transport(&self) -> &'static str {
        self.notifier
            .as_ref()
            .map_or("not_configured", |n| n.transport())
    }
}
