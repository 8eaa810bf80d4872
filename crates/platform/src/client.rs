//! HTTP transport for the example-platform API.
//!
//! The base URL is resolved once, when the client is built: an explicit
//! override wins, then the `API_URL` environment variable, then
//! [`DEFAULT_API_URL`]. It cannot change afterwards.

use crate::error::Result;
use crate::transport::{Method, Request, Response, Transport};
use std::collections::BTreeMap;
use std::time::Duration;

/// Base URL used when neither an override nor `API_URL` is set.
pub const DEFAULT_API_URL: &str = "https://example-third-part-platform.replace-me.workers.dev/api";

/// Environment variable consulted by [`ApiClient::from_env`].
pub const API_URL_ENV: &str = "API_URL";

/// Default timeout for a whole request, connect to last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for building an [`ApiClient`].
#[derive(Debug, Clone, Default)]
pub struct ApiOptions {
    /// API URL to use (overrides the environment variable).
    pub api_url: Option<String>,
    /// Request timeout (defaults to [`DEFAULT_TIMEOUT`]).
    pub timeout: Option<Duration>,
}

impl ApiOptions {
    /// Set the API URL.
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Minimal blocking API client.
///
/// # Example
///
/// ```no_run
/// use platform::{ApiClient, ApiOptions, Transport};
///
/// let api = ApiClient::new(ApiOptions::default().api_url("http://localhost:8787/api"));
/// let response = api.get("/org/fe110c72/user/42").unwrap();
/// if response.status() == 404 {
///     println!("user is gone");
/// }
/// ```
pub struct ApiClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Base URL every path is appended to.
    base_url: String,
}

impl ApiClient {
    /// Create a client, falling back to `API_URL` and then the default URL.
    #[must_use]
    pub fn new(options: ApiOptions) -> Self {
        let base_url = options
            .api_url
            .or_else(env_api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::with_base_url(base_url, options.timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    /// Create a client configured only from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ApiOptions::default())
    }

    fn with_base_url(base_url: String, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();
        let agent = ureq::Agent::new_with_config(config);
        let base_url = base_url.trim_end_matches('/').to_string();
        log::debug!("API client using {}", base_url);
        Self { agent, base_url }
    }

    /// Get the resolved base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for a path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Transport for ApiClient {
    fn send(&self, request: Request) -> Result<Response> {
        let url = self.url(request.path());
        let headers = request.effective_headers();
        let body = request.body().unwrap_or_default();

        log::debug!("{} {}", request.method(), url);

        let result = match request.method() {
            Method::Get => with_headers(self.agent.get(&url), &headers).call(),
            Method::Delete => with_headers(self.agent.delete(&url), &headers).call(),
            Method::Post => with_headers(self.agent.post(&url), &headers).send(body),
            Method::Patch => with_headers(self.agent.patch(&url), &headers).send(body),
        };

        let mut response = result?;
        let status = response.status().as_u16();
        let bytes = response.body_mut().read_to_vec()?;

        log::trace!("{} {} -> {} ({} bytes)", request.method(), url, status, bytes.len());
        Ok(Response::new(status, bytes))
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &BTreeMap<String, String>,
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn env_api_url() -> Option<String> {
    std::env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answer one request with `status_line`, returning the raw request head
    fn serve_once(status_line: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{{}}",
                status_line
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&head).to_ascii_lowercase()
        });
        (url, handle)
    }

    fn local_client(url: &str) -> ApiClient {
        ApiClient::new(
            ApiOptions::default()
                .api_url(url)
                .timeout(Duration::from_secs(5)),
        )
    }

    #[test]
    fn test_not_found_is_a_response() {
        let (url, server) = serve_once("404 Not Found");
        let client = local_client(&url);

        let response = client
            .send(Request::new(Method::Delete, "/org/o/user/1").header("X-A", "b"))
            .unwrap();
        assert_eq!(response.status(), 404);
        assert!(!response.ok());
        assert_eq!(response.status_text(), "Not Found");

        let head = server.join().unwrap();
        assert!(head.starts_with("delete /org/o/user/1 http/1.1"));
        assert!(head.contains("content-type: application/json"));
        assert!(head.contains("x-a: b"));
    }

    #[test]
    fn test_server_error_is_a_response() {
        let (url, server) = serve_once("500 Internal Server Error");
        let client = local_client(&url);

        let response = client.get("/org/o/user/1").unwrap();
        assert_eq!(response.status(), 500);
        assert_eq!(response.status_text(), "Internal Server Error");
        assert!(matches!(
            response.error_for_status(),
            Err(Error::Api { status: 500, .. })
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_explicit_url_wins() {
        let client = ApiClient::new(ApiOptions::default().api_url("http://localhost:8787/api/"));
        assert_eq!(client.base_url(), "http://localhost:8787/api");
        assert_eq!(
            client.url("/org/a/users"),
            "http://localhost:8787/api/org/a/users"
        );
    }

    #[test]
    fn test_options_builder() {
        let options = ApiOptions::default()
            .api_url("http://127.0.0.1:1")
            .timeout(Duration::from_secs(2));
        assert_eq!(options.api_url.as_deref(), Some("http://127.0.0.1:1"));
        assert_eq!(options.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_unreachable_host_is_http_error() {
        // Port 1 on localhost refuses connections
        let client = ApiClient::new(
            ApiOptions::default()
                .api_url("http://127.0.0.1:1")
                .timeout(Duration::from_secs(2)),
        );
        let err = client.get("/anything").unwrap_err();
        assert!(err.is_retryable());
    }
}
