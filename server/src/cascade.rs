//! Destructive removal of events and tickets. Callers confirm intent first.

use crate::error::WalletError;
use crate::storage::{Collection, Store, TxMode};

/// What a cascade removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CascadeReport {
    pub event_removed: bool,
    pub tickets_removed: u64,
}

/// Deletes the event and every ticket indexed under it in one transaction.
/// Either all of it commits or none of it does.
pub async fn delete_event(store: &Store, event_id: i64) -> Result<CascadeReport, WalletError> {
    let mut tx = store
        .begin(&[Collection::Events, Collection::Tickets], TxMode::ReadWrite)
        .await?;

    let event_removed = tx.delete_event(event_id).await?;
    let tickets_removed = tx.delete_tickets_by_event(event_id).await?;
    tx.commit().await.map_err(|e| {
        tracing::error!(event_id, error = %e, "Event deletion aborted");
        e
    })?;

    tracing::info!(event_id, event_removed, tickets_removed, "Event deleted");
    Ok(CascadeReport {
        event_removed,
        tickets_removed,
    })
}

/// Deletes one ticket. Deleting a missing ticket succeeds and returns `false`.
pub async fn delete_ticket(store: &Store, ticket_id: i64) -> Result<bool, WalletError> {
    let removed = store.delete_ticket(ticket_id).await?;
    tracing::info!(ticket_id, removed, "Ticket deleted");
    Ok(removed)
}
