//! HTTP helpers for Lambda functions.
//!
//! Every response, errors included, carries permissive CORS headers so the
//! single-page frontend can call the API cross-origin.

use lambda_http::{Body, Response};
use serde::{Deserialize, Serialize};

use crate::Error;

/// CORS headers applied to every response.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type,Authorization"),
    ("Access-Control-Allow-Methods", "GET,POST,PUT,DELETE,OPTIONS"),
];

/// Structured error body returned by every handler.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    let mut builder = Response::builder()
        .status(status)
        .header("content-type", "application/json");
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }
    Ok(builder
        .body(Body::from(serde_json::to_string(data)?))
        .expect("Failed to build response"))
}

/// Create a `{message, code}` error response.
pub fn error_response(
    status: u16,
    message: impl Into<String>,
    code: impl Into<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        status,
        &ErrorBody {
            message: message.into(),
            code: code.into(),
        },
    )
}

/// Map an [`Error`] to its `{message, code}` response.
pub fn respond_error(err: &Error) -> Result<Response<Body>, lambda_http::Error> {
    error_response(err.status_code(), err.to_string(), err.code())
}

/// Empty 200 response answering a CORS preflight.
pub fn preflight_response() -> Response<Body> {
    let mut builder = Response::builder().status(200);
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }
    builder
        .body(Body::Empty)
        .expect("Failed to build response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let response = error_response(404, "Reservation not found", "RESERVATION_NOT_FOUND")
            .unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );

        let body: ErrorBody = serde_json::from_slice(response.body().as_ref()).unwrap();
        assert_eq!(body.code, "RESERVATION_NOT_FOUND");
    }

    #[test]
    fn test_preflight_is_empty() {
        let response = preflight_response();
        assert_eq!(response.status(), 200);
        assert!(matches!(response.body(), &Body::Empty));
    }
}
