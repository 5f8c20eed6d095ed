//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `CalendlyClient` builds an
//! `HttpRequest`, hands it to an `HttpTransport`, and interprets whatever
//! comes back. The default transport (`UreqTransport`) talks to the network;
//! tests substitute an in-memory double.
//!
//! A transport must tell apart "the server answered with an error status"
//! from "no response was received at all", because the client translates
//! the two differently. `TransportError::Status` carries the full response
//! so the client can read its body and headers.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is relative to the transport's base URL and always starts with
/// `/`. Read requests carry their parameters in `query`; every other verb
/// carries a JSON `body`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Whether the content-type header starts with `application/json`.
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|value| value.starts_with("application/json"))
    }
}

/// Failure reported by an `HttpTransport`.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The server answered with a 4xx or 5xx status.
    Status(HttpResponse),

    /// No response was received (DNS, connect, TLS, timeout, IO).
    Network { message: String, code: Option<u16> },
}

/// Executes one HTTP round trip.
///
/// Implementations must be safe to share between threads; the client holds
/// a single transport and may be used concurrently.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(headers: Vec<(&str, &str)>) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: String::new(),
        }
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = response(vec![("Content-Type", "text/plain")]);
        assert_eq!(resp.content_type(), Some("text/plain"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(resp.header("x-missing"), None);
    }

    #[test]
    fn json_detection_requires_prefix() {
        assert!(response(vec![("content-type", "application/json")]).is_json());
        assert!(response(vec![("content-type", "application/json; charset=utf-8")]).is_json());
        assert!(!response(vec![("content-type", "text/html")]).is_json());
        assert!(!response(vec![("content-type", "text/application/json")]).is_json());
        assert!(!response(Vec::new()).is_json());
    }

    #[test]
    fn first_header_wins() {
        let resp = response(vec![
            ("content-type", "text/plain"),
            ("content-type", "application/json"),
        ]);
        assert!(!resp.is_json());
    }
}
