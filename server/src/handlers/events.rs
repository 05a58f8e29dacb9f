use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::cascade::{self, CascadeReport};
use crate::models::Event;
use crate::registry;
use crate::state::AppState;
use crate::utils::response::{created, success};
use crate::utils::AppError;
use crate::view::WalletView;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(rename = "apiUrl")]
    pub api_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ScanEventRequest {
    pub payload: String,
}

#[derive(Serialize)]
struct EventCreated {
    event: Event,
    wallet: WalletView,
}

#[derive(Serialize)]
struct EventDeleted {
    #[serde(flatten)]
    report: CascadeReport,
    wallet: WalletView,
}

pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = registry::list_events(&state.store).await?;
    Ok(success(events, "Events loaded"))
}

pub async fn get(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let event = registry::get_event(&state.store, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {event_id} was not found")))?;
    Ok(success(event, "Event loaded"))
}

/// Manual entry of an event's name and endpoint.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    let event = registry::create_event(&state.store, request.name, request.api_url).await?;
    respond_created(&state, event).await
}

/// Registration from a scanned `name@apiUrl` code.
pub async fn scan(
    State(state): State<AppState>,
    Json(request): Json<ScanEventRequest>,
) -> Result<Response, AppError> {
    let event = registry::create_event_from_payload(&state.store, &request.payload).await?;
    respond_created(&state, event).await
}

async fn respond_created(state: &AppState, event: Event) -> Result<Response, AppError> {
    // A new event becomes the latest and therefore the default selection.
    let wallet = WalletView::load(&state.store, Some(event.id)).await?;
    Ok(created(EventCreated { event, wallet }, "Event created"))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let report = cascade::delete_event(&state.store, event_id).await?;
    let wallet = WalletView::load(&state.store, None).await?;
    Ok(success(
        EventDeleted { report, wallet },
        "Event and its tickets deleted",
    ))
}
