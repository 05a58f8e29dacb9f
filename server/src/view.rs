use serde::Serialize;

use crate::error::WalletError;
use crate::models::Event;
use crate::registry;
use crate::status::TicketCard;
use crate::storage::Store;

/// A freshly queried picture of the wallet, returned after every mutation so
/// callers never have to reload to see its effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletView {
    pub events: Vec<Event>,
    pub selected: Option<Event>,
    pub tickets: Vec<TicketCard>,
}

impl WalletView {
    /// `requested` is the caller's current selection; a stale or missing one
    /// falls back to the latest event.
    pub async fn load(store: &Store, requested: Option<i64>) -> Result<Self, WalletError> {
        let events = registry::list_events(store).await?;
        let selected = registry::resolve_selection(&events, requested).cloned();

        let tickets = match &selected {
            Some(event) => store
                .tickets_by_event(event.id)
                .await?
                .iter()
                .map(TicketCard::from)
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            events,
            selected,
            tickets,
        })
    }
}
