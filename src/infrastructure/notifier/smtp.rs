use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{entities::contact::ContactEmail, errors::NotifyError};

use super::Notifier;

const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends through an authenticated SMTP relay.
///
/// Port 465 uses implicit TLS, every other port requires STARTTLS.
pub struct SmtpNotifier {
    from: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(
        host: &str,
        port: u16,
        user: &str,
        password: &str,
        from: String,
    ) -> Result<Self, NotifyError> {
        let builder = if port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };

        let transport = builder
            .port(port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        Ok(Self { from, transport })
    }

    /// Builds the outgoing message. A reply-to address that is not a valid
    /// mailbox is left out rather than failing the send.
    fn build_message(&self, email: &ContactEmail) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.parse::<Mailbox>()?)
            .to(email.to.parse::<Mailbox>()?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN);

        match email.reply_to.parse::<Mailbox>() {
            Ok(reply_to) => builder = builder.reply_to(reply_to),
            Err(e) => tracing::warn!("Omitting Reply-To from contact email: {}", e),
        }

        Ok(builder.body(email.text.clone())?)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn transport(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &ContactEmail) -> Result<(), NotifyError> {
        let message = self.build_message(email)?;
        let response = self.transport.send(message).await?;
        if response.is_positive() {
            Ok(())
        } else {
            Err(NotifyError::Transport(format!(
                "SMTP server replied {}",
                response.code()
            )))
        }
    }
}
