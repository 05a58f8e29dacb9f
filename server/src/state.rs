use std::sync::Arc;

use crate::ingest::TicketValidator;
use crate::storage::Store;

/// Shared by every handler. The store is the storage session each wallet
/// operation is given explicitly.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub validator: Arc<dyn TicketValidator>,
}

impl AppState {
    pub fn new(store: Store, validator: Arc<dyn TicketValidator>) -> Self {
        Self { store, validator }
    }
}
