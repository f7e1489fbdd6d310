use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::Display;
use serde_json::json;

use crate::constants::MAX_DETAIL_CHARS;

/// Every way a contact submission can be rejected.
///
/// The display form is the wire error code.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum ContactError {
    #[display("must_be_json")]
    MustBeJson,

    #[display("invalid_json")]
    InvalidJson,

    #[display("missing_fields")]
    MissingFields,

    #[display("invalid_email")]
    InvalidEmail,

    #[display("invalid_message_length")]
    InvalidMessageLength,

    #[display("rate_limited")]
    RateLimited,

    #[display("send_failed")]
    SendFailed(String),
}

impl ContactError {
    /// Builds a `SendFailed` with its detail cut to the response limit.
    pub fn send_failed(detail: impl AsRef<str>) -> Self {
        ContactError::SendFailed(truncate_chars(detail.as_ref(), MAX_DETAIL_CHARS))
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ContactError::SendFailed(detail) => Some(detail),
            _ => None,
        }
    }
}

impl std::error::Error for ContactError {}

impl ResponseError for ContactError {
    fn error_response(&self) -> HttpResponse {
        let body = match self.detail() {
            Some(detail) => json!({ "ok": false, "error": self.to_string(), "detail": detail }),
            None => json!({ "ok": false, "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::MustBeJson
            | ContactError::InvalidJson
            | ContactError::MissingFields
            | ContactError::InvalidEmail
            | ContactError::InvalidMessageLength => StatusCode::BAD_REQUEST,
            ContactError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ContactError::SendFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Failures talking to the counter store.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display("Counter store connection failed: {_0}")]
    Connection(String),

    #[display("Counter store operation failed: {_0}")]
    Operation(String),
}

impl std::error::Error for StoreError {}

impl From<deadpool_redis::PoolError> for StoreError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Operation(err.to_string())
    }
}

/// Failures delivering the notification email.
#[derive(Debug, Display)]
pub enum NotifyError {
    /// The email API answered with a non-success status; carries the body.
    #[display("{_1}")]
    Rejected(u16, String),

    #[display("{_0}")]
    Transport(String),

    #[display("Invalid mailbox: {_0}")]
    InvalidMailbox(String),
}

impl std::error::Error for NotifyError {}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

impl From<lettre::address::AddressError> for NotifyError {
    fn from(err: lettre::address::AddressError) -> Self {
        NotifyError::InvalidMailbox(err.to_string())
    }
}

impl From<lettre::error::Error> for NotifyError {
    fn from(err: lettre::error::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NotifyError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

impl From<NotifyError> for ContactError {
    fn from(err: NotifyError) -> Self {
        ContactError::send_failed(err.to_string())
    }
}

pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
