//! Calendly API client: webhook subscription operations over an injectable
//! transport.
//!
//! # Design
//! `CalendlyClient` holds a transport and an organization source and carries
//! no mutable state between calls. Every operation funnels through
//! `call_api`, which is itself split into `build_request` (pure, produces an
//! `HttpRequest`) and `parse_response` (pure, interprets the transport's
//! result). Only the transport touches the network.

use serde_json::Value;
use tracing::debug;

use crate::config::{CalendlyConfig, ConfigError, OrganizationSource};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::transport::UreqTransport;
use crate::types::{ApiResponse, CreateWebhook, EventKind, JsonMap};

const ECHO: &str = "echo";
const WEBHOOK_SUBSCRIPTIONS: &str = "webhook_subscriptions";

/// Synchronous client for the Calendly webhook subscription API.
///
/// Each public operation performs exactly one HTTP round trip (or none, when
/// local validation fails). The client is `Sync` whenever its transport is,
/// so it can be shared across threads without locking.
#[derive(Debug, Clone)]
pub struct CalendlyClient<T = UreqTransport> {
    transport: T,
    organization: OrganizationSource,
}

impl CalendlyClient<UreqTransport> {
    /// Build a client with the default `ureq` transport. The bearer token is
    /// taken from `config` now and never re-read.
    pub fn new(config: &CalendlyConfig) -> Self {
        Self {
            transport: UreqTransport::new(config),
            organization: config.organization.clone(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(&CalendlyConfig::from_env()?))
    }
}

impl<T: HttpTransport> CalendlyClient<T> {
    /// Build a client around a caller-supplied transport. The transport is
    /// responsible for the base URL and authorization.
    pub fn with_transport(transport: T, organization: OrganizationSource) -> Self {
        Self {
            transport,
            organization,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /echo`. Useful only to check that the token is accepted.
    pub fn echo(&self) -> Result<JsonMap, ApiError> {
        let response = self.call_api(HttpMethod::Get, ECHO, &JsonMap::new())?;
        into_object(response)
    }

    /// `POST /webhook_subscriptions`.
    ///
    /// Every entry of `events` must name an `EventKind`; otherwise the call
    /// fails with `ApiError::InvalidEventTypes` before anything is sent.
    pub fn create_webhook<S: AsRef<str>>(&self, url: &str, events: &[S]) -> Result<JsonMap, ApiError> {
        let events = validate_events(events)?;
        let body = CreateWebhook {
            url: url.to_string(),
            events,
            organization: self.organization.resolve(),
        };
        let params = match serde_json::to_value(&body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(ApiError::Serialization("expected a JSON object".to_string())),
            Err(e) => return Err(ApiError::Serialization(e.to_string())),
        };
        let response = self.call_api(HttpMethod::Post, WEBHOOK_SUBSCRIPTIONS, &params)?;
        into_object(response)
    }

    /// `GET /webhook_subscriptions/{id}`, scoped to the organization.
    pub fn get_webhook(&self, id: &str) -> Result<JsonMap, ApiError> {
        let endpoint = subscription_endpoint(id)?;
        let response = self.call_api(HttpMethod::Get, &endpoint, &self.scope_params())?;
        into_object(response)
    }

    /// `GET /webhook_subscriptions`, scoped to the organization. Only the
    /// first page the API returns is fetched.
    pub fn list_webhooks(&self) -> Result<JsonMap, ApiError> {
        let response = self.call_api(HttpMethod::Get, WEBHOOK_SUBSCRIPTIONS, &self.scope_params())?;
        into_object(response)
    }

    /// `DELETE /webhook_subscriptions/{id}`. A 404 counts as success.
    pub fn delete_webhook(&self, id: &str) -> Result<(), ApiError> {
        let endpoint = subscription_endpoint(id)?;
        match self.call_api(HttpMethod::Delete, &endpoint, &JsonMap::new()) {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => {
                debug!(id, "webhook subscription already gone");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Execute one request against the transport.
    ///
    /// `params` become the query string for `GET` and the JSON body for
    /// every other verb.
    pub fn call_api(&self, method: HttpMethod, endpoint: &str, params: &JsonMap) -> Result<ApiResponse, ApiError> {
        let request = build_request(method, endpoint, params)?;
        debug!(method = method.as_str(), path = %request.path, "calling Calendly API");

        let result = self.transport.execute(&request);
        match &result {
            Ok(response) => debug!(status = response.status, "Calendly API responded"),
            Err(TransportError::Status(response)) => {
                debug!(status = response.status, "Calendly API returned an error status")
            }
            Err(TransportError::Network { message, .. }) => {
                debug!(error = %message, "Calendly API unreachable")
            }
        }

        parse_response(result)
    }

    fn scope_params(&self) -> JsonMap {
        let mut params = JsonMap::new();
        params.insert("scope".to_string(), Value::from("organization"));
        params.insert(
            "organization".to_string(),
            self.organization.resolve().map_or(Value::Null, Value::from),
        );
        params
    }
}

/// Turn a verb, endpoint and parameter map into an `HttpRequest`.
pub fn build_request(method: HttpMethod, endpoint: &str, params: &JsonMap) -> Result<HttpRequest, ApiError> {
    let path = format!("/{endpoint}");

    if method == HttpMethod::Get {
        return Ok(HttpRequest {
            method,
            path,
            query: query_pairs(params),
            headers: Vec::new(),
            body: None,
        });
    }

    let body = serde_json::to_string(params).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        query: Vec::new(),
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

/// Translate a transport result into the client's error taxonomy.
pub fn parse_response(result: Result<HttpResponse, TransportError>) -> Result<ApiResponse, ApiError> {
    match result {
        Ok(response) if response.is_json() => serde_json::from_str(&response.body)
            .map(ApiResponse::Json)
            .map_err(|e| ApiError::InvalidJson(e.to_string())),
        Ok(response) => Ok(ApiResponse::Raw(response)),
        Err(TransportError::Status(response)) if (400..500).contains(&response.status) => {
            Err(upstream_error(response))
        }
        Err(TransportError::Status(response)) => Err(ApiError::Transport {
            message: format!("server error: HTTP {}: {}", response.status, response.body),
            code: Some(response.status),
        }),
        Err(TransportError::Network { message, code }) => Err(ApiError::Transport { message, code }),
    }
}

/// The error carries the raw body as its message. A JSON body must still
/// decode, and its `message` field is kept alongside.
fn upstream_error(response: HttpResponse) -> ApiError {
    let mut message = None;
    if response.is_json() {
        match serde_json::from_str::<Value>(&response.body) {
            Ok(value) => {
                message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            Err(e) => return ApiError::InvalidJson(e.to_string()),
        }
    }
    ApiError::Upstream {
        status: response.status,
        body: response.body,
        message,
    }
}

/// An id must stay a single path segment; `/`, `?` and `#` would change the
/// request's path, query or fragment.
fn subscription_endpoint(id: &str) -> Result<String, ApiError> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(ApiError::InvalidSubscriptionId(id.to_string()));
    }
    Ok(format!("{WEBHOOK_SUBSCRIPTIONS}/{id}"))
}

fn validate_events<S: AsRef<str>>(events: &[S]) -> Result<Vec<EventKind>, ApiError> {
    let mut kinds = Vec::with_capacity(events.len());
    let mut unknown = Vec::new();
    for event in events {
        match event.as_ref().parse::<EventKind>() {
            Ok(kind) => kinds.push(kind),
            Err(e) => unknown.push(e.0),
        }
    }
    if !unknown.is_empty() {
        return Err(ApiError::InvalidEventTypes { unknown });
    }
    Ok(kinds)
}

/// Null parameters are dropped; strings go as-is; anything else is sent as
/// its JSON text.
fn query_pairs(params: &JsonMap) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), value))
        })
        .collect()
}

fn into_object(response: ApiResponse) -> Result<JsonMap, ApiError> {
    match response {
        ApiResponse::Json(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::InvalidJson("expected a JSON object response".to_string())),
    }
}
