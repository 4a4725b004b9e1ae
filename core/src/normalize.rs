//! Response normalization.
//!
//! Turns the settled outcome of a round-trip into exactly one of: a decoded
//! value, a `Transport` error, a `Request` error, or a `Decode` error. There
//! are no retries and no timeouts here; callers own any retry policy.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{Blob, HttpResponse, TransportError};

/// Which body shape a call expects on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Json,
    Blob,
}

impl ResponseShape {
    /// Value for the `Accept` header, if the shape implies one.
    pub fn accept(self) -> Option<&'static str> {
        match self {
            ResponseShape::Json => Some("application/json"),
            ResponseShape::Blob => None,
        }
    }
}

/// Normalize a JSON-shaped call.
pub fn normalize_json<T: DeserializeOwned>(
    outcome: Result<HttpResponse, TransportError>,
) -> Result<T, ApiError> {
    let response = settle(outcome)?;
    serde_json::from_slice(&response.body).map_err(ApiError::Decode)
}

/// Normalize a blob-shaped call.
pub fn normalize_blob(outcome: Result<HttpResponse, TransportError>) -> Result<Blob, ApiError> {
    let response = settle(outcome)?;
    let content_type = response.header("content-type").map(str::to_string);
    Ok(Blob {
        content_type,
        bytes: response.body,
    })
}

fn settle(outcome: Result<HttpResponse, TransportError>) -> Result<HttpResponse, ApiError> {
    let response = outcome?;
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Request(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn response(status: u16, status_text: &str, body: &[u8]) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status,
            status_text: status_text.to_string(),
            headers: vec![("content-type".to_string(), "image/jpeg".to_string())],
            body: body.to_vec(),
        })
    }

    #[test]
    fn json_success_decodes_body() {
        let categories: Vec<Category> =
            normalize_json(response(200, "OK", br#"[{"id":1,"name":"food"}]"#)).unwrap();
        assert_eq!(categories, vec![Category { id: 1, name: "food".to_string() }]);
    }

    #[test]
    fn json_failure_keeps_original_response() {
        let body = br#"{"message":"invalid password"}"#;
        let err = normalize_json::<serde_json::Value>(response(401, "Unauthorized", body)).unwrap_err();
        match err {
            ApiError::Request(resp) => {
                assert_eq!(resp.status, 401);
                assert_eq!(resp.body, body.to_vec());
            }
            other => panic!("expected request error, got {other:?}"),
        }
    }

    #[test]
    fn json_malformed_body_is_decode_error() {
        let err = normalize_json::<Vec<Category>>(response(200, "OK", b"not json")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn blob_success_keeps_bytes_and_content_type() {
        let blob = normalize_blob(response(200, "OK", &[0xff, 0xd8, 0xff])).unwrap();
        assert_eq!(blob.bytes, vec![0xff, 0xd8, 0xff]);
        assert_eq!(blob.content_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn blob_failure_message_is_status_and_reason() {
        let err = normalize_blob(response(404, "Not Found", b"")).unwrap_err();
        assert_eq!(err.to_string(), "404: Not Found");
    }

    #[test]
    fn transport_failure_passes_through_both_shapes() {
        let err = normalize_blob(Err(TransportError::new("connection refused"))).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        let err =
            normalize_json::<serde_json::Value>(Err(TransportError::new("connection reset"))).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
