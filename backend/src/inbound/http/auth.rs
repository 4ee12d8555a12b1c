//! Customer identity extraction for HTTP handlers.
//!
//! Authentication lives in the gateway in front of this service; it verifies
//! credentials and forwards the caller's identity in the `X-Customer-Id`
//! header. Handlers take a [`Principal`] parameter and never see credentials.

use std::future::{Ready, ready};
use std::str::FromStr;

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use serde_json::json;

use crate::domain::{CustomerId, Error};

/// Header carrying the authenticated customer id, set by the gateway.
pub const CUSTOMER_ID_HEADER: &str = "X-Customer-Id";

/// Authenticated caller extracted from the gateway-supplied header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// Customer the gateway authenticated.
    pub customer_id: CustomerId,
}

fn missing_header() -> Error {
    Error::unauthorized("missing customer identity").with_details(json!({
        "header": CUSTOMER_ID_HEADER,
        "code": "missing_header",
    }))
}

fn malformed_header() -> Error {
    Error::unauthorized("malformed customer identity").with_details(json!({
        "header": CUSTOMER_ID_HEADER,
        "code": "malformed_header",
    }))
}

fn principal_from_request(req: &HttpRequest) -> Result<Principal, Error> {
    let raw = req
        .headers()
        .get(CUSTOMER_ID_HEADER)
        .ok_or_else(missing_header)?
        .to_str()
        .map_err(|_| malformed_header())?;
    let customer_id = CustomerId::from_str(raw).map_err(|_| malformed_header())?;
    Ok(Principal { customer_id })
}

impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(principal_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use crate::domain::ErrorCode;

    #[test]
    fn header_yields_principal() {
        let id = CustomerId::random();
        let req = TestRequest::default()
            .insert_header((CUSTOMER_ID_HEADER, id.to_string()))
            .to_http_request();
        let principal = principal_from_request(&req).expect("valid header");
        assert_eq!(principal.customer_id, id);
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = principal_from_request(&req).expect_err("no header");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn malformed_header_is_unauthorized() {
        let req = TestRequest::default()
            .insert_header((CUSTOMER_ID_HEADER, "not-a-uuid"))
            .to_http_request();
        let err = principal_from_request(&req).expect_err("bad uuid");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
