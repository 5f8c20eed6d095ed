//! In-memory stand-in for the Calendly webhook subscription endpoints.
//!
//! Serves `/echo` and `/webhook_subscriptions[/{id}]` with bearer-token
//! checking and Calendly-shaped JSON bodies. State lives for the lifetime of
//! the router.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const RESOURCE_BASE: &str = "https://api.calendly.com";

const KNOWN_EVENTS: [&str; 2] = ["invitee.created", "invitee.canceled"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebhookSubscription {
    pub uri: String,
    pub callback_url: String,
    pub state: String,
    pub events: Vec<String>,
    pub scope: String,
    pub organization: String,
}

#[derive(Deserialize)]
pub struct CreateWebhook {
    pub url: String,
    #[serde(default)]
    pub events: Vec<String>,
    pub organization: Option<String>,
}

#[derive(Deserialize)]
pub struct ScopeQuery {
    pub scope: Option<String>,
    pub organization: Option<String>,
}

pub type Db = Arc<RwLock<BTreeMap<String, WebhookSubscription>>>;

#[derive(Clone)]
struct AppState {
    token: Arc<str>,
    db: Db,
}

/// Error body in the shape Calendly uses: `{"title", "message"}`.
#[derive(Debug)]
struct Failure {
    status: StatusCode,
    title: &'static str,
    message: &'static str,
}

impl Failure {
    fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            title: "Unauthenticated",
            message: "The access token is invalid",
        }
    }

    fn invalid_argument() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            title: "Invalid Argument",
            message: "The supplied parameters are invalid.",
        }
    }

    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            title: "Resource Not Found",
            message: "The server could not find the requested resource.",
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = Json(json!({ "title": self.title, "message": self.message }));
        (self.status, body).into_response()
    }
}

pub fn app(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        db: Arc::new(RwLock::new(BTreeMap::new())),
    };
    Router::new()
        .route("/echo", get(echo))
        .route("/webhook_subscriptions", get(list_webhooks).post(create_webhook))
        .route("/webhook_subscriptions/{id}", get(get_webhook).delete(delete_webhook))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Failure> {
    let expected = format!("Bearer {}", state.token);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(Failure::unauthenticated()),
    }
}

async fn echo(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, Failure> {
    authorize(&state, &headers)?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn create_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateWebhook>,
) -> Result<(StatusCode, Json<serde_json::Value>), Failure> {
    authorize(&state, &headers)?;

    let organization = input.organization.ok_or_else(Failure::invalid_argument)?;
    let valid_url = input.url.starts_with("http://") || input.url.starts_with("https://");
    let valid_events =
        !input.events.is_empty() && input.events.iter().all(|e| KNOWN_EVENTS.contains(&e.as_str()));
    if !valid_url || !valid_events {
        return Err(Failure::invalid_argument());
    }

    let id = Uuid::new_v4().to_string();
    let subscription = WebhookSubscription {
        uri: format!("{RESOURCE_BASE}/webhook_subscriptions/{id}"),
        callback_url: input.url,
        state: "active".to_string(),
        events: input.events,
        scope: "organization".to_string(),
        organization,
    };
    state.db.write().await.insert(id, subscription.clone());
    Ok((StatusCode::CREATED, Json(json!({ "resource": subscription }))))
}

async fn list_webhooks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<serde_json::Value>, Failure> {
    authorize(&state, &headers)?;

    let organization = match (query.scope.as_deref(), query.organization) {
        (Some("organization"), Some(organization)) => organization,
        _ => return Err(Failure::invalid_argument()),
    };

    let db = state.db.read().await;
    let collection: Vec<&WebhookSubscription> =
        db.values().filter(|s| s.organization == organization).collect();
    let count = collection.len();
    Ok(Json(json!({
        "collection": collection,
        "pagination": { "count": count, "next_page": null },
    })))
}

async fn get_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Failure> {
    authorize(&state, &headers)?;
    let db = state.db.read().await;
    let subscription = db.get(&id).ok_or_else(Failure::not_found)?;
    Ok(Json(json!({ "resource": subscription })))
}

async fn delete_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, Failure> {
    authorize(&state, &headers)?;
    state
        .db
        .write()
        .await
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(Failure::not_found)
}
