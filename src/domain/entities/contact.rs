use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

/// Raw contact form body as posted by the site.
///
/// Every field is optional at this stage; values that are not JSON strings
/// are treated as absent.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    #[serde(default, deserialize_with = "string_or_none")]
    pub first_name: Option<String>,

    #[serde(default, deserialize_with = "string_or_none")]
    pub last_name: Option<String>,

    #[serde(default, deserialize_with = "string_or_none")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "string_or_none")]
    pub message: Option<String>,

    /// Honeypot, hidden from humans.
    #[serde(default, deserialize_with = "string_or_none")]
    pub company: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// A normalized submission that passed the presence checks.
///
/// `email` is collapsed to a single line, `message` is trimmed only.
/// The bounds are enforced by [`Validate`] and count Unicode scalar values,
/// so a character outside the Basic Multilingual Plane (most emoji) counts
/// once, not as two UTF-16 code units.
#[derive(Debug, Clone, Validate, PartialEq, Eq)]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,

    #[validate(length(max = 254), contains(pattern = "@"))]
    pub email: String,

    #[validate(length(min = 2, max = 5000))]
    pub message: String,
}

impl ContactSubmission {
    /// First and last name joined on one line, empty if neither was given.
    pub fn full_name(&self) -> String {
        collapse_whitespace(&format!("{} {}", self.first_name, self.last_name))
    }
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    Honeypot,
    NotConfigured,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressReason::Honeypot => "honeypot",
            SuppressReason::NotConfigured => "not_configured",
        }
    }
}

/// Successful terminal states of the contact pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Sent,
    Suppressed(SuppressReason),
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ContactResponse {
    pub ok: bool,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SuppressReason>,
}

impl From<ContactOutcome> for ContactResponse {
    fn from(outcome: ContactOutcome) -> Self {
        match outcome {
            ContactOutcome::Sent => ContactResponse { ok: true, sent: true, reason: None },
            ContactOutcome::Suppressed(reason) => ContactResponse {
                ok: true,
                sent: false,
                reason: Some(reason),
            },
        }
    }
}

/// The notification email built from a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail {
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}

impl ContactEmail {
    pub fn compose(submission: &ContactSubmission, to: &str) -> Self {
        let name = submission.full_name();

        let subject = if name.is_empty() {
            "Portfolio contact".to_string()
        } else {
            format!("Portfolio contact from {name}")
        };

        let text = [
            format!("Name: {}", if name.is_empty() { "-" } else { &name }),
            format!("Email: {}", submission.email),
            String::new(),
            "Message:".to_string(),
            submission.message.clone(),
        ]
        .join("\n");

        ContactEmail {
            to: to.to_string(),
            reply_to: submission.email.clone(),
            subject,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(first: &str, last: &str) -> ContactSubmission {
        ContactSubmission {
            first_name: first.into(),
            last_name: last.into(),
            email: "ada@example.com".into(),
            message: "Hello there,\n  nice site.".into(),
        }
    }

    #[test]
    fn non_string_fields_deserialize_as_absent() {
        let payload: ContactPayload = serde_json::from_str(
            r#"{"email": 42, "message": "hi", "company": false, "firstName": null}"#,
        )
        .unwrap();

        assert_eq!(payload.email, None);
        assert_eq!(payload.company, None);
        assert_eq!(payload.first_name, None);
        assert_eq!(payload.message.as_deref(), Some("hi"));
    }

    #[test]
    fn top_level_scalar_is_rejected() {
        assert!(serde_json::from_str::<ContactPayload>("null").is_err());
        assert!(serde_json::from_str::<ContactPayload>("\"text\"").is_err());
    }

    #[test]
    fn collapse_whitespace_is_idempotent() {
        let once = collapse_whitespace("  a \t b\n\nc  ");
        assert_eq!(once, "a b c");
        assert_eq!(collapse_whitespace(&once), once);
    }

    #[test]
    fn compose_with_name() {
        let email = ContactEmail::compose(&submission(" Ada ", "Lovelace"), "owner@example.com");

        assert_eq!(email.subject, "Portfolio contact from Ada Lovelace");
        assert_eq!(email.to, "owner@example.com");
        assert_eq!(email.reply_to, "ada@example.com");
        assert_eq!(
            email.text,
            "Name: Ada Lovelace\nEmail: ada@example.com\n\nMessage:\nHello there,\n  nice site."
        );
    }

    #[test]
    fn compose_without_name() {
        let email = ContactEmail::compose(&submission("", "  "), "owner@example.com");

        assert_eq!(email.subject, "Portfolio contact");
        assert!(email.text.starts_with("Name: -\n"));
    }

    #[test]
    fn response_shapes() {
        let sent = serde_json::to_value(ContactResponse::from(ContactOutcome::Sent)).unwrap();
        assert_eq!(sent, serde_json::json!({"ok": true, "sent": true}));

        let honeypot = serde_json::to_value(ContactResponse::from(ContactOutcome::Suppressed(
            SuppressReason::Honeypot,
        )))
        .unwrap();
        assert_eq!(
            honeypot,
            serde_json::json!({"ok": true, "sent": false, "reason": "honeypot"})
        );
    }
}
