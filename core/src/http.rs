//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and normalizes `HttpResponse` values; the only place a network
//! round-trip can happen is behind the `Transport` trait, which the host
//! (the storefront binary, or a test) implements.
//!
//! Bodies are raw bytes because listing submissions carry an image and the
//! item image endpoint returns one.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the absolute URL: the client has already prefixed the
/// configured base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The "ok" flag: true for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Binary payload produced by blob-mode calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The network round-trip never completed (unreachable host, aborted
/// connection, unreadable body).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Executes an `HttpRequest` against the network.
///
/// Non-2xx statuses are NOT transport failures: implementations must
/// return them as `Ok(HttpResponse)` so the normalizer can classify them.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            status_text: String::new(),
            headers: vec![("Content-Type".to_string(), "image/jpeg".to_string())],
            body: Vec::new(),
        }
    }

    #[test]
    fn success_covers_the_2xx_range_only() {
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(response(299).is_success());
        assert!(!response(199).is_success());
        assert!(!response(301).is_success());
        assert!(!response(412).is_success());
    }

    #[test]
    fn header_lookup_ignores_case() {
        assert_eq!(response(200).header("content-type"), Some("image/jpeg"));
        assert_eq!(response(200).header("accept"), None);
    }

    #[test]
    fn closures_are_transports() {
        let transport = |req: HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                status_text: "OK".to_string(),
                headers: Vec::new(),
                body: req.path.into_bytes(),
            })
        };
        let resp = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                path: "http://localhost/items".to_string(),
                headers: Vec::new(),
                body: None,
            })
            .unwrap();
        assert_eq!(resp.body_text(), "http://localhost/items");
    }
}
