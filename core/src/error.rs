//! Error types for the marketplace API client.
//!
//! # Design
//! One tagged error covers every way a call can fail, whichever result
//! shape (JSON or blob) the caller asked for:
//!
//! - `Transport`: the round-trip never completed.
//! - `Request`: the server answered with a non-2xx status. The original
//!   response is kept so callers can inspect status and body; the message
//!   is always `"<status>: <statusText>"`.
//! - `Decode`: a 2xx body did not parse as the expected JSON.
//! - `Serialization`: the request payload could not be encoded.

use thiserror::Error;

use crate::http::{HttpResponse, TransportError};

/// Errors returned by the normalizer and the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{}: {}", .0.status, .0.status_text)]
    Request(HttpResponse),

    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("request payload could not be encoded: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl ApiError {
    /// Status code of a `Request` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request(response) => Some(response.status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// The `{"message": "..."}` body the server attaches to failures.
    pub fn server_message(&self) -> Option<String> {
        let ApiError::Request(response) = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_slice(&response.body).ok()?;
        value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
    }
}
