use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::cascade;
use crate::ingest::{self, IngestOutcome};
use crate::models::Ticket;
use crate::state::AppState;
use crate::status::{self, TicketCard, TicketStatus};
use crate::utils::response::{created, success};
use crate::utils::AppError;
use crate::view::WalletView;

#[derive(Debug, Deserialize)]
pub struct AddTicketRequest {
    pub ticket_data: String,
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
enum TicketAdded {
    Accepted { ticket: Ticket, wallet: WalletView },
    Rejected,
}

#[derive(Serialize)]
struct TicketDetail {
    ticket: Ticket,
    status: TicketStatus,
}

#[derive(Serialize)]
struct TicketDeleted {
    removed: bool,
    wallet: WalletView,
}

pub async fn list_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    if state.store.get_event(event_id).await?.is_none() {
        return Err(AppError::UnknownEvent(event_id));
    }
    let cards: Vec<TicketCard> = state
        .store
        .tickets_by_event(event_id)
        .await?
        .iter()
        .map(TicketCard::from)
        .collect();
    Ok(success(cards, "Tickets loaded"))
}

/// Scanned or typed ticket payload for an event.
pub async fn add(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(request): Json<AddTicketRequest>,
) -> Result<Response, AppError> {
    let outcome = ingest::ingest_ticket(
        &state.store,
        &*state.validator,
        event_id,
        &request.ticket_data,
    )
    .await?;

    match outcome {
        IngestOutcome::Accepted(ticket) => {
            let wallet = WalletView::load(&state.store, Some(event_id)).await?;
            Ok(created(TicketAdded::Accepted { ticket, wallet }, "Ticket added"))
        }
        IngestOutcome::Rejected => Ok(success(TicketAdded::Rejected, "Ticket rejected")),
    }
}

pub async fn get(
    State(state): State<AppState>,
    Path(ticket_id): Path<i64>,
) -> Result<Response, AppError> {
    let ticket = state
        .store
        .get_ticket(ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {ticket_id} was not found")))?;

    let status = status::resolve(&ticket);
    Ok(success(TicketDetail { ticket, status }, "Ticket loaded"))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(ticket_id): Path<i64>,
) -> Result<Response, AppError> {
    let event_id = state.store.get_ticket(ticket_id).await?.map(|t| t.event_id);
    let removed = cascade::delete_ticket(&state.store, ticket_id).await?;
    let wallet = WalletView::load(&state.store, event_id).await?;
    Ok(success(TicketDeleted { removed, wallet }, "Ticket deleted"))
}
