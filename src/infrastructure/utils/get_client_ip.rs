use actix_web::HttpRequest;

/// Best-effort client address from proxy headers.
///
/// Prefers the first `X-Forwarded-For` entry, then `X-Real-IP`. The socket
/// peer is not used, so a request that arrives without either header has no
/// known origin.
pub fn get_client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            if !s.is_empty() {
                let first = s.split(',').next().unwrap_or("").trim();
                return (!first.is_empty()).then(|| first.to_string());
            }
        }
    }

    req.headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn forwarded_for_takes_the_first_hop() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", " 203.0.113.7 , 10.0.0.2"))
            .insert_header(("x-real-ip", "10.0.0.9"))
            .to_http_request();

        assert_eq!(get_client_ip(&req).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn falls_back_to_real_ip() {
        let req = TestRequest::default()
            .insert_header(("x-real-ip", " 198.51.100.4 "))
            .to_http_request();

        assert_eq!(get_client_ip(&req).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn empty_first_hop_is_unknown() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", ", 10.0.0.2"))
            .to_http_request();

        assert_eq!(get_client_ip(&req), None);
    }

    #[test]
    fn no_headers_no_address() {
        let req = TestRequest::default()
            .peer_addr("192.0.2.1:5555".parse().unwrap())
            .to_http_request();

        assert_eq!(get_client_ip(&req), None);
    }
}
