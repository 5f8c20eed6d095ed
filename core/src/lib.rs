//! Synchronous client for the Calendly webhook subscription API.
//!
//! # Overview
//! Wraps five endpoints (`/echo` plus create/get/list/delete of webhook
//! subscriptions) behind `CalendlyClient`. Requests carry a bearer token,
//! reads send their parameters as a query string and writes as a JSON body.
//! Every failure surfaces as an `ApiError` with a message and, where one
//! exists, an HTTP-derived code.
//!
//! # Design
//! - `CalendlyClient` is stateless apart from immutable configuration.
//! - The network sits behind the `HttpTransport` trait. `UreqTransport` is
//!   the default; tests plug in a recording double or point the default at
//!   the mock server.
//! - Request building and response interpretation are pure functions
//!   (`build_request`, `parse_response`) so they can be tested without I/O.
//! - No retries, pagination, or signature checks.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{build_request, parse_response, CalendlyClient};
pub use config::{CalendlyConfig, ConfigError, OrganizationSource, API_URL};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
pub use transport::UreqTransport;
pub use types::{ApiResponse, CreateWebhook, EventKind, JsonMap, UnknownEventKind};
