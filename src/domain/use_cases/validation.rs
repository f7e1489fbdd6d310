use serde_json::Value;
use validator::Validate;

use crate::{
    entities::contact::{collapse_whitespace, ContactPayload, ContactSubmission},
    errors::ContactError,
};

/// Result of validating a payload that was not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated {
    /// The honeypot field was filled; nothing else was checked.
    Honeypot,
    Submission(ContactSubmission),
}

/// Checks the declared content type and decodes the body, which must be a
/// JSON object.
pub fn parse_payload(content_type: Option<&str>, body: &[u8]) -> Result<ContactPayload, ContactError> {
    if !content_type.unwrap_or_default().contains("application/json") {
        return Err(ContactError::MustBeJson);
    }

    // Derived struct deserialization would also fill fields from an array.
    match serde_json::from_slice::<Value>(body) {
        Ok(object @ Value::Object(_)) => {
            serde_json::from_value(object).map_err(|_| ContactError::InvalidJson)
        }
        _ => Err(ContactError::InvalidJson),
    }
}

/// Normalizes a decoded payload and applies the field rules in order:
/// honeypot, presence, email shape, message length.
pub fn validate_payload(payload: ContactPayload) -> Result<Validated, ContactError> {
    if non_blank(payload.company.as_deref()).is_some() {
        return Ok(Validated::Honeypot);
    }

    let (Some(email), Some(message)) = (
        non_blank(payload.email.as_deref()),
        non_blank(payload.message.as_deref()),
    ) else {
        return Err(ContactError::MissingFields);
    };

    let submission = ContactSubmission {
        first_name: payload.first_name.as_deref().unwrap_or_default().trim().to_string(),
        last_name: payload.last_name.as_deref().unwrap_or_default().trim().to_string(),
        email: collapse_whitespace(email),
        message: message.trim().to_string(),
    };

    if let Err(errors) = submission.validate() {
        let fields = errors.field_errors();
        return Err(if fields.contains_key("email") {
            ContactError::InvalidEmail
        } else {
            ContactError::InvalidMessageLength
        });
    }

    Ok(Validated::Submission(submission))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
