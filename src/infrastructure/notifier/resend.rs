use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;
use zeroize::Zeroizing;

use crate::{
    constants::MAX_DETAIL_CHARS,
    entities::contact::ContactEmail,
    errors::{truncate_chars, NotifyError},
};

use super::Notifier;

/// Sends through a transactional email HTTP API with bearer auth.
pub struct ResendNotifier {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    from: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    reply_to: &'a str,
}

impl ResendNotifier {
    pub fn new(endpoint: &str, api_key: &str, from: String) -> Result<Self, NotifyError> {
        let endpoint: Url = endpoint
            .parse()
            .map_err(|e: url::ParseError| NotifyError::Transport(format!("invalid endpoint: {e}")))?;

        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: Zeroizing::new(api_key.to_string()),
            from,
        })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    fn transport(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, email: &ContactEmail) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&SendEmailRequest {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                text: &email.text,
                reply_to: &email.reply_to,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected(
            status.as_u16(),
            truncate_chars(&body, MAX_DETAIL_CHARS),
        ))
    }
}
