//! Transport abstraction for the example-platform API.
//!
//! [`Transport`] is the seam between resource handlers and the network.
//! [`ApiClient`](crate::ApiClient) implements it over HTTP and
//! [`MockPlatform`](crate::MockPlatform) implements it in memory.
//!
//! Two rules hold for every implementation:
//! - default headers (`content-type: application/json`) are merged with
//!   the caller's headers, and the caller wins on a key conflict
//! - a non-2xx status is returned as a [`Response`], never as an error

use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;

/// Headers sent with every request unless the caller overrides them.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[("content-type", "application/json")];

/// HTTP methods used by the platform API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Uppercase method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    /// Create a request without a body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a caller header, overriding any default with the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON-encoded body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let bytes = serde_json::to_vec(body).map_err(|e| Error::Encode(e.to_string()))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Path appended to the base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Encoded body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Headers to send: defaults merged with caller headers.
    ///
    /// Names are lowercased so that `Content-Type` from the caller replaces
    /// the default `content-type`.
    #[must_use]
    pub fn effective_headers(&self) -> BTreeMap<String, String> {
        let mut headers: BTreeMap<String, String> = DEFAULT_HEADERS
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        for (name, value) in &self.headers {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }
        headers
    }
}

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: Vec<u8>,
}

impl Response {
    /// Create a response from a status and raw body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Canonical reason phrase for the status.
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        reason_phrase(self.status)
    }

    /// Raw body bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Body as text (lossy UTF-8).
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    /// Turn a non-2xx status into [`Error::Api`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.ok() {
            Ok(self)
        } else {
            Err(Error::api(self.status, self.status_text()))
        }
    }
}

/// Canonical reason phrase for a status code.
#[must_use]
pub fn reason_phrase(status: u16) -> &'static str {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
}

/// Something that can carry requests to the platform API.
///
/// Implementors only provide [`send`](Transport::send); the verb helpers
/// build the request and JSON-encode bodies.
pub trait Transport: Send + Sync {
    /// Send a request and return the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] only when no response was received.
    fn send(&self, request: Request) -> Result<Response>;

    /// GET `path`.
    fn get(&self, path: &str) -> Result<Response> {
        self.send(Request::new(Method::Get, path))
    }

    /// POST `body` as JSON to `path`.
    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response>
    where
        Self: Sized,
    {
        self.send(Request::new(Method::Post, path).json(body)?)
    }

    /// PATCH `body` as JSON to `path`.
    fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response>
    where
        Self: Sized,
    {
        self.send(Request::new(Method::Patch, path).json(body)?)
    }

    /// DELETE `path`.
    fn delete(&self, path: &str) -> Result<Response> {
        self.send(Request::new(Method::Delete, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_headers() {
        let request = Request::new(Method::Get, "/org/a/users");
        let headers = request.effective_headers();
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_caller_headers_win() {
        let request = Request::new(Method::Post, "/x")
            .header("Content-Type", "application/merge-patch+json")
            .header("Authorization", "Bearer token");
        let headers = request.effective_headers();
        assert_eq!(
            headers.get("content-type").unwrap(),
            "application/merge-patch+json"
        );
        assert_eq!(headers.get("authorization").unwrap(), "Bearer token");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_json_body() {
        let request = Request::new(Method::Post, "/x")
            .json(&json!({"firstName": "A"}))
            .unwrap();
        assert_eq!(request.body().unwrap(), br#"{"firstName":"A"}"#);
        assert!(Request::new(Method::Get, "/x").body().is_none());
    }

    #[test]
    fn test_response_status_is_data() {
        let ok = Response::new(201, r#"{"id":"1"}"#);
        assert!(ok.ok());
        assert_eq!(ok.status_text(), "Created");
        let value: serde_json::Value = ok.json().unwrap();
        assert_eq!(value["id"], "1");

        let missing = Response::new(404, "");
        assert!(!missing.ok());
        assert_eq!(missing.status_text(), "Not Found");
        assert!(matches!(
            missing.error_for_status(),
            Err(Error::Api { status: 404, .. })
        ));
    }

    #[test]
    fn test_invalid_json_body() {
        let response = Response::new(200, "not json");
        let result: Result<serde_json::Value> = response.json();
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
        assert_eq!(response.text(), "not json");
    }

    #[test]
    fn test_reason_phrase_unknown() {
        assert_eq!(reason_phrase(299), "Unknown Status");
        assert_eq!(reason_phrase(500), "Internal Server Error");
    }
}
