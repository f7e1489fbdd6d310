use actix_web::{http::header::CONTENT_TYPE, web, HttpRequest, HttpResponse};

use crate::{
    entities::contact::{ContactOutcome, ContactResponse},
    errors::ContactError,
    use_cases::{extractors::ClientIp, validation::parse_payload},
    AppState,
};

/// `POST /api/contact`
///
/// The body is taken as raw bytes so content-type and JSON failures map to
/// the form's own error codes.
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    client_ip: ClientIp,
    body: web::Bytes,
) -> Result<HttpResponse, ContactError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let payload = parse_payload(content_type, &body)?;

    let outcome = state
        .contact_handler
        .submit(payload, client_ip.as_deref())
        .await?;

    let mut response = match outcome {
        ContactOutcome::Sent => HttpResponse::Ok(),
        ContactOutcome::Suppressed(_) => HttpResponse::Accepted(),
    };
    Ok(response.json(ContactResponse::from(outcome)))
}
