//! Domain types for the webhook subscription API.
//!
//! # Design
//! The API is relayed, not modelled: subscription resources come back as
//! generic JSON maps. Only the pieces the client itself inspects or produces
//! get types here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::HttpResponse;

/// Decoded JSON object returned by the typed operations.
pub type JsonMap = Map<String, Value>;

/// Invitee event a webhook subscription can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "invitee.created")]
    InviteeCreated,
    #[serde(rename = "invitee.canceled")]
    InviteeCanceled,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::InviteeCreated, EventKind::InviteeCanceled];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::InviteeCreated => "invitee.created",
            EventKind::InviteeCanceled => "invitee.canceled",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for EventKind {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Returned by `EventKind::from_str` for names outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// JSON body of `POST /webhook_subscriptions`.
///
/// `organization` serializes as `null` when no organization is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWebhook {
    pub url: String,
    pub events: Vec<EventKind>,
    pub organization: Option<String>,
}

/// Result of the low-level executor: a decoded JSON body, or the response
/// untouched when it did not advertise JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Raw(HttpResponse),
}

impl ApiResponse {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Raw(_) => None,
        }
    }
}
