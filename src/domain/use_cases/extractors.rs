use std::{
    convert::Infallible,
    future::{ready, Ready},
};

use actix_web::{dev::Payload, FromRequest, HttpRequest};

use crate::utils::get_client_ip::get_client_ip;

/// Extractor for the caller's address as reported by the fronting proxy.
/// Holds `None` when no proxy header is present.
/// Usage: Add `client_ip: ClientIp` as a parameter to your handler function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl ClientIp {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for ClientIp {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(ClientIp(get_client_ip(req))))
    }
}
