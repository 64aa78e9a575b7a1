// API response utility functions module

use crate::logger;
use crate::store::StoreError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::convert::Infallible;

/// Build JSON response
#[allow(clippy::unnecessary_wraps)]
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(
                    r#"{"error":"Internal server error"}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error")))));
        }
    };

    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        }))
}

/// 204 No Content response
pub fn no_content() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// 404 Not Found response
pub fn not_found(message: &str) -> Response<Full<Bytes>> {
    error_body(StatusCode::NOT_FOUND, "Not Found", message)
}

/// 400 Bad Request response
pub fn bad_request(message: &str) -> Response<Full<Bytes>> {
    error_body(StatusCode::BAD_REQUEST, "Bad Request", message)
}

/// 500 Internal Server Error response
pub fn internal_error(message: &str) -> Response<Full<Bytes>> {
    error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", message)
}

/// 405 Method Not Allowed response
pub fn method_not_allowed() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, POST, PUT, DELETE, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("405 Method Not Allowed"))))
}

/// 413 Payload Too Large response
pub fn payload_too_large() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::PAYLOAD_TOO_LARGE)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("413 Payload Too Large")))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("413 Payload Too Large"))))
}

/// OPTIONS preflight response
pub fn options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, POST, PUT, DELETE, OPTIONS");

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Map a store failure onto its HTTP response: missing-record lookups are
/// 404, broken invariants are 500 (and logged).
pub fn store_error_response(err: &StoreError) -> Response<Full<Bytes>> {
    if err.is_not_found() {
        not_found(&err.to_string())
    } else {
        logger::log_error(&err.to_string());
        internal_error(&err.to_string())
    }
}

fn error_body(status: StatusCode, error: &str, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": error,
        "message": message
    });
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_class_maps_to_404() {
        let response = store_error_response(&StoreError::AccountNotFound(999));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = store_error_response(&StoreError::InstrumentNotFound {
            account: 100,
            instrument: 7,
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_class_maps_to_500() {
        for err in [
            StoreError::AmbiguousAccount(100),
            StoreError::AmbiguousInstrument {
                account: 100,
                instrument: 101,
            },
            StoreError::EmptyPayinPis(100),
            StoreError::RemovalFailed {
                account: 100,
                instrument: 101,
            },
        ] {
            let response = store_error_response(&err);
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_no_content_has_empty_body() {
        let response = no_content();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
