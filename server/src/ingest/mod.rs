//! Ticket acquisition: scanned payload → validation endpoint → persisted ticket.

mod validator;

use crate::error::WalletError;
use crate::models::{NewTicket, Ticket};
use crate::storage::Store;

pub use validator::{
    parse_reply, HttpValidator, TicketFields, TicketValidator, ValidationReply, TICKET_DATA_PARAM,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Accepted(Ticket),
    /// The endpoint declared the payload invalid. Nothing was stored.
    Rejected,
}

/// Validates `ticket_data` against the event's endpoint and stores the resulting ticket.
///
/// Every call that is accepted creates a new ticket, even for a payload that is
/// already in the wallet.
pub async fn ingest_ticket(
    store: &Store,
    validator: &dyn TicketValidator,
    event_id: i64,
    ticket_data: &str,
) -> Result<IngestOutcome, WalletError> {
    if ticket_data.trim().is_empty() {
        return Err(WalletError::validation("Ticket data must not be empty"));
    }

    let event = store
        .get_event(event_id)
        .await?
        .ok_or(WalletError::UnknownEvent(event_id))?;

    let fields = match validator.validate(&event.api_url, ticket_data).await {
        Ok(ValidationReply::Accepted(fields)) => fields,
        Ok(ValidationReply::Rejected) => {
            tracing::info!(event_id, "Ticket rejected by validation endpoint");
            return Ok(IngestOutcome::Rejected);
        }
        Err(e) => {
            tracing::warn!(event_id, error = %e, "Ticket validation failed");
            return Err(e);
        }
    };

    let new_ticket = NewTicket {
        event_id,
        ticket_data: ticket_data.to_string(),
        ticket_name: fields.ticket_name,
        ticket_number: fields.ticket_number,
        ticket_state: fields.ticket_state,
        entry_time: fields.entry_time,
    };

    // The event may have been deleted while the endpoint was being queried.
    let ticket = store
        .put_ticket_for_event(new_ticket)
        .await?
        .ok_or(WalletError::UnknownEvent(event_id))?;

    tracing::info!(
        event_id,
        ticket_id = ticket.id,
        state = ticket.ticket_state.as_deref().unwrap_or("-"),
        "Ticket stored"
    );
    Ok(IngestOutcome::Accepted(ticket))
}
