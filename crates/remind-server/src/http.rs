//! Request/response API for creating and listing events.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use remind_core::{Event, EventId, EventStore, ValidationError, parse_event_time};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

/// Shared state for the API handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub store: Arc<EventStore>,
}

/// Builds the API router.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/events", get(list_events).post(create_event))
        .with_state(state)
        .layer(cors)
}

/// Message-only response body, used for errors.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Errors surfaced to API callers.
#[derive(Debug)]
pub enum ApiError {
    /// The event failed validation.
    Validation(ValidationError),
    /// The body was not the expected JSON.
    BadRequest(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Validation(err) => err.to_string(),
            Self::BadRequest(message) => message,
        };
        // Caller mistakes, not faults.
        tracing::debug!(%message, "request rejected");
        (StatusCode::BAD_REQUEST, Json(MessageBody { message })).into_response()
    }
}

/// Request body for creating an event. Every field is optional so that a
/// missing one is reported as a validation failure rather than a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time: Option<String>,
}

/// An event as returned over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub time: DateTime<Utc>,
    pub notified: bool,
    pub overlaps: bool,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            notified: event.is_notified(),
            overlaps: event.overlaps,
            title: event.title,
            description: event.description,
            time: event.start_time,
        }
    }
}

/// Response body for a created event.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedBody {
    pub message: String,
    pub event: EventView,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value.ok_or(ValidationError::Missing { field })
}

/// POST /events - Register an upcoming event
async fn create_event(
    State(state): State<ApiState>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let title = required(req.title, "title")?;
    let description = required(req.description, "description")?;
    let time = required(req.time, "time")?;
    let start_time = parse_event_time(&time)?;

    let event = state.store.add(title, description, start_time, Utc::now())?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedBody {
            message: "Event created successfully".to_string(),
            event: event.into(),
        }),
    ))
}

/// GET /events - List events that have not started yet
async fn list_events(State(state): State<ApiState>) -> Json<Vec<EventView>> {
    let events = state
        .store
        .list_upcoming(Utc::now())
        .into_iter()
        .map(EventView::from)
        .collect();
    Json(events)
}
