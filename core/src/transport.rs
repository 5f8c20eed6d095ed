//! Default blocking transport backed by `ureq`.
//!
//! The agent is built with `http_status_as_error(false)` so error statuses
//! arrive as responses; this module then sorts them into
//! `TransportError::Status` itself, keeping the body and headers intact.

use ureq::{Agent, RequestBuilder};

use crate::config::CalendlyConfig;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// `HttpTransport` that sends requests to a fixed base URL with a bearer
/// token attached.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    base_url: String,
    authorization: String,
}

impl UreqTransport {
    pub fn new(config: &CalendlyConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {}", config.api_key),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Content-type comes from `request.headers` only; it must not be set
    /// again on the builder.
    fn prepare<B>(&self, builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
        let mut builder = builder
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        for (key, value) in &request.query {
            builder = builder.query(key, value);
        }
        builder
    }
}

impl HttpTransport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let result = match request.method {
            HttpMethod::Get => self.prepare(self.agent.get(&url), request).call(),
            HttpMethod::Post => {
                let builder = self.prepare(self.agent.post(&url), request);
                match request.body.as_deref() {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Delete => {
                let builder = self.prepare(self.agent.delete(&url), request);
                match request.body.as_deref() {
                    Some(body) => builder.force_send_body().send(body.as_bytes()),
                    None => builder.call(),
                }
            }
        };

        let mut response = result.map_err(network_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(network_error)?;

        let response = HttpResponse {
            status,
            headers,
            body,
        };

        if status >= 400 {
            return Err(TransportError::Status(response));
        }
        Ok(response)
    }
}

fn network_error(err: ureq::Error) -> TransportError {
    TransportError::Network {
        message: err.to_string(),
        code: None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;

    use super::*;

    /// Accept one connection, answer 204, and return the raw request head
    /// lines and body.
    fn capture_one(listener: TcpListener) -> std::thread::JoinHandle<(Vec<String>, String)> {
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut head = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end().to_string();
                if line.is_empty() {
                    break;
                }
                head.push(line);
            }

            let length = head
                .iter()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().unwrap())
                })
                .unwrap_or(0);
            let mut body = vec![0; length];
            reader.read_exact(&mut body).unwrap();

            let mut stream = stream;
            stream
                .write_all(b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .unwrap();

            (head, String::from_utf8(body).unwrap())
        })
    }

    fn header_count(head: &[String], name: &str) -> usize {
        head.iter()
            .filter(|line| {
                line.split_once(':')
                    .is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            })
            .count()
    }

    fn send_json(method: HttpMethod, path: &str) -> (Vec<String>, String) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = capture_one(listener);

        let config = CalendlyConfig::new("token").with_base_url(format!("http://{addr}"));
        let transport = UreqTransport::new(&config);
        let request = HttpRequest {
            method,
            path: path.to_string(),
            query: Vec::new(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(r#"{"url":"https://example.com/hook"}"#.to_string()),
        };
        let response = transport.execute(&request).unwrap();
        assert_eq!(response.status, 204);

        server.join().unwrap()
    }

    #[test]
    fn post_sends_content_type_once() {
        let (head, body) = send_json(HttpMethod::Post, "/webhook_subscriptions");
        assert!(head[0].starts_with("POST /webhook_subscriptions "));
        assert_eq!(header_count(&head, "content-type"), 1, "{head:?}");
        assert_eq!(header_count(&head, "authorization"), 1, "{head:?}");
        assert!(head.iter().any(|line| line.eq_ignore_ascii_case("authorization: Bearer token")));
        assert_eq!(body, r#"{"url":"https://example.com/hook"}"#);
    }

    #[test]
    fn delete_sends_content_type_once() {
        let (head, body) = send_json(HttpMethod::Delete, "/webhook_subscriptions/abc");
        assert!(head[0].starts_with("DELETE /webhook_subscriptions/abc "));
        assert_eq!(header_count(&head, "content-type"), 1, "{head:?}");
        assert_eq!(body, r#"{"url":"https://example.com/hook"}"#);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = CalendlyConfig::new("token").with_base_url("http://localhost:3000/");
        let transport = UreqTransport::new(&config);
        assert_eq!(transport.base_url(), "http://localhost:3000");
    }

    #[test]
    fn bearer_token_is_captured_at_construction() {
        let mut config = CalendlyConfig::new("first");
        let transport = UreqTransport::new(&config);
        config.api_key = "second".to_string();
        assert_eq!(transport.authorization, "Bearer first");
        assert_eq!(UreqTransport::new(&config).authorization, "Bearer second");
    }

    #[test]
    fn connection_failure_is_a_network_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let config = CalendlyConfig::new("token").with_base_url(format!("http://{addr}"));
        let transport = UreqTransport::new(&config);
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: "/echo".to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.execute(&request).unwrap_err();
        assert!(matches!(err, TransportError::Network { code: None, .. }));
    }
}
