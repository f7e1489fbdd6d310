use std::sync::Arc;

use async_trait::async_trait;

use crate::{entities::contact::ContactEmail, errors::NotifyError, settings::AppConfig};

pub mod resend;
pub mod smtp;

pub use resend::ResendNotifier;
pub use smtp::SmtpNotifier;

/// Delivers the contact email to the site owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name of the transport, for logs and health output.
    fn transport(&self) -> &'static str;

    async fn send(&self, email: &ContactEmail) -> Result<(), NotifyError>;
}

/// Picks the transport from whichever credentials are configured.
///
/// The email API takes precedence over SMTP. Returns `None` when neither is
/// usable, which puts the form in accepted-but-not-sent mode.
pub fn build_notifier(config: &AppConfig) -> Option<Arc<dyn Notifier>> {
    let smtp_configured = config.smtp_host.is_some();

    if let Some(api_key) = &config.resend_api_key {
        if smtp_configured {
            tracing::warn!("Both email API and SMTP are configured; using the email API");
        }
        let from = config
            .contact_from_email
            .clone()
            .unwrap_or_else(|| crate::constants::DEFAULT_RESEND_FROM_EMAIL.to_string());

        return match ResendNotifier::new(&config.resend_api_url, api_key, from) {
            Ok(notifier) => Some(Arc::new(notifier)),
            Err(e) => {
                tracing::error!("Email API notifier disabled: {}", e);
                None
            }
        };
    }

    if let (Some(host), Some(user), Some(password)) =
        (&config.smtp_host, &config.smtp_user, &config.smtp_password)
    {
        let from = config.contact_from_email.clone().unwrap_or_else(|| user.clone());

        return match SmtpNotifier::new(host, config.smtp_port, user, password, from) {
            Ok(notifier) => Some(Arc::new(notifier)),
            Err(e) => {
                tracing::error!("SMTP notifier disabled: {}", e);
                None
            }
        };
    }

    None
}
