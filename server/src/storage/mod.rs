//! Durable storage for events and tickets.
//!
//! SQLite through `sqlx` provides the two collections and the non-unique
//! `tickets.event_id` index. Every read or write happens inside a [`StoreTx`],
//! which is scoped to the collections it declares up front and rolls back when
//! dropped without [`StoreTx::commit`].

mod error;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::models::{Event, NewEvent, NewTicket, Ticket};

pub use error::StorageError;

const BUSY_TIMEOUT_SECS: u64 = 5;

/// The record kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Events,
    Tickets,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::Tickets => "tickets",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    ReadOnly,
    ReadWrite,
}

/// Handle to the wallet database. Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if needed) the database at `url` and brings the schema up to date.
    /// Safe to call against an already-initialized database.
    pub async fn open(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// A private in-memory database. Pinned to a single connection, since every
    /// SQLite connection to `:memory:` would otherwise see its own empty database.
    pub async fn open_in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Waits for every connection to be returned and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!("Wallet schema is up to date");
        Ok(Self { pool })
    }

    /// Starts a transaction over `scope`. Nothing it writes is visible to others
    /// until [`StoreTx::commit`]; dropping it first discards every write.
    ///
    /// A read-write transaction must issue its first write before any read: SQLite
    /// fails a contended read-to-write upgrade at once instead of waiting out the busy timeout.
    pub async fn begin(
        &self,
        scope: &[Collection],
        mode: TxMode,
    ) -> Result<StoreTx, StorageError> {
        let tx = self.pool.begin().await?;
        Ok(StoreTx {
            tx,
            scope: scope.to_vec(),
            mode,
        })
    }

    pub async fn put_event(&self, event: NewEvent) -> Result<Event, StorageError> {
        let mut tx = self.begin(&[Collection::Events], TxMode::ReadWrite).await?;
        let event = tx.put_event(event).await?;
        tx.commit().await?;
        Ok(event)
    }

    pub async fn get_event(&self, id: i64) -> Result<Option<Event>, StorageError> {
        let mut tx = self.begin(&[Collection::Events], TxMode::ReadOnly).await?;
        let event = tx.get_event(id).await?;
        tx.commit().await?;
        Ok(event)
    }

    pub async fn all_events(&self) -> Result<Vec<Event>, StorageError> {
        let mut tx = self.begin(&[Collection::Events], TxMode::ReadOnly).await?;
        let events = tx.all_events().await?;
        tx.commit().await?;
        Ok(events)
    }

    pub async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>, StorageError> {
        let mut tx = self.begin(&[Collection::Tickets], TxMode::ReadOnly).await?;
        let ticket = tx.get_ticket(id).await?;
        tx.commit().await?;
        Ok(ticket)
    }

    pub async fn all_tickets(&self) -> Result<Vec<Ticket>, StorageError> {
        let mut tx = self.begin(&[Collection::Tickets], TxMode::ReadOnly).await?;
        let tickets = tx.all_tickets().await?;
        tx.commit().await?;
        Ok(tickets)
    }

    pub async fn tickets_by_event(&self, event_id: i64) -> Result<Vec<Ticket>, StorageError> {
        let mut tx = self.begin(&[Collection::Tickets], TxMode::ReadOnly).await?;
        let tickets = tx.tickets_by_event(event_id).await?;
        tx.commit().await?;
        Ok(tickets)
    }

    pub async fn put_ticket_for_event(
        &self,
        ticket: NewTicket,
    ) -> Result<Option<Ticket>, StorageError> {
        let mut tx = self
            .begin(&[Collection::Events, Collection::Tickets], TxMode::ReadWrite)
            .await?;
        let ticket = tx.put_ticket_for_event(ticket).await?;
        tx.commit().await?;
        Ok(ticket)
    }

    pub async fn delete_ticket(&self, id: i64) -> Result<bool, StorageError> {
        let mut tx = self.begin(&[Collection::Tickets], TxMode::ReadWrite).await?;
        let removed = tx.delete_ticket(id).await?;
        tx.commit().await?;
        Ok(removed)
    }
}

/// A transaction over a fixed set of collections.
pub struct StoreTx {
    tx: Transaction<'static, Sqlite>,
    scope: Vec<Collection>,
    mode: TxMode,
}

impl StoreTx {
    pub async fn commit(self) -> Result<(), StorageError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discards every write made so far. Dropping the transaction has the same effect.
    pub async fn rollback(self) -> Result<(), StorageError> {
        self.tx.rollback().await?;
        Ok(())
    }

    fn check_read(&self, collection: Collection) -> Result<(), StorageError> {
        if self.scope.contains(&collection) {
            Ok(())
        } else {
            Err(StorageError::OutOfScope(collection))
        }
    }

    fn check_write(&self, collection: Collection) -> Result<(), StorageError> {
        self.check_read(collection)?;
        match self.mode {
            TxMode::ReadWrite => Ok(()),
            TxMode::ReadOnly => Err(StorageError::ReadOnly(collection)),
        }
    }

    // ============================================
    // Events
    // ============================================

    pub async fn put_event(&mut self, event: NewEvent) -> Result<Event, StorageError> {
        self.check_write(Collection::Events)?;

        let id = sqlx::query("INSERT INTO events (name, api_url) VALUES (?, ?)")
            .bind(&event.name)
            .bind(&event.api_url)
            .execute(&mut *self.tx)
            .await?
            .last_insert_rowid();

        Ok(event.with_id(id))
    }

    pub async fn get_event(&mut self, id: i64) -> Result<Option<Event>, StorageError> {
        self.check_read(Collection::Events)?;

        let event = sqlx::query_as::<_, Event>("SELECT id, name, api_url FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(event)
    }

    pub async fn all_events(&mut self) -> Result<Vec<Event>, StorageError> {
        self.check_read(Collection::Events)?;

        let events = sqlx::query_as::<_, Event>("SELECT id, name, api_url FROM events ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(events)
    }

    /// Removes the event record only. Returns whether a record was present.
    pub async fn delete_event(&mut self, id: i64) -> Result<bool, StorageError> {
        self.check_write(Collection::Events)?;

        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Tickets
    // ============================================

    pub async fn put_ticket(&mut self, ticket: NewTicket) -> Result<Ticket, StorageError> {
        self.check_write(Collection::Tickets)?;

        let id = sqlx::query(
            r#"
            INSERT INTO tickets (event_id, ticket_data, ticket_name, ticket_number, ticket_state, entry_time)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(ticket.event_id)
        .bind(&ticket.ticket_data)
        .bind(&ticket.ticket_name)
        .bind(&ticket.ticket_number)
        .bind(&ticket.ticket_state)
        .bind(&ticket.entry_time)
        .execute(&mut *self.tx)
        .await?
        .last_insert_rowid();

        Ok(ticket.with_id(id))
    }

    /// Inserts the ticket only if its event still exists, as a single statement so
    /// the transaction takes the write lock up front. `None` means the event is gone.
    pub async fn put_ticket_for_event(
        &mut self,
        ticket: NewTicket,
    ) -> Result<Option<Ticket>, StorageError> {
        self.check_read(Collection::Events)?;
        self.check_write(Collection::Tickets)?;

        let result = sqlx::query(
            r#"
            INSERT INTO tickets (event_id, ticket_data, ticket_name, ticket_number, ticket_state, entry_time)
            SELECT ?, ?, ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM events WHERE id = ?)
            "#,
        )
        .bind(ticket.event_id)
        .bind(&ticket.ticket_data)
        .bind(&ticket.ticket_name)
        .bind(&ticket.ticket_number)
        .bind(&ticket.ticket_state)
        .bind(&ticket.entry_time)
        .bind(ticket.event_id)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(ticket.with_id(result.last_insert_rowid())))
    }

    pub async fn get_ticket(&mut self, id: i64) -> Result<Option<Ticket>, StorageError> {
        self.check_read(Collection::Tickets)?;

        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT id, event_id, ticket_data, ticket_name, ticket_number, ticket_state, entry_time
            FROM tickets
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(ticket)
    }

    pub async fn all_tickets(&mut self) -> Result<Vec<Ticket>, StorageError> {
        self.check_read(Collection::Tickets)?;

        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT id, event_id, ticket_data, ticket_name, ticket_number, ticket_state, entry_time
            FROM tickets
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(tickets)
    }

    /// Tickets indexed under `event_id`, looked up through `tickets_event_id`.
    pub async fn tickets_by_event(&mut self, event_id: i64) -> Result<Vec<Ticket>, StorageError> {
        self.check_read(Collection::Tickets)?;

        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT id, event_id, ticket_data, ticket_name, ticket_number, ticket_state, entry_time
            FROM tickets INDEXED BY tickets_event_id
            WHERE event_id = ?
            ORDER BY id
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(tickets)
    }

    pub async fn delete_ticket(&mut self, id: i64) -> Result<bool, StorageError> {
        self.check_write(Collection::Tickets)?;

        let result = sqlx::query("DELETE FROM tickets WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every ticket indexed under `event_id`; returns how many were removed.
    pub async fn delete_tickets_by_event(&mut self, event_id: i64) -> Result<u64, StorageError> {
        self.check_write(Collection::Tickets)?;

        let result = sqlx::query("DELETE FROM tickets INDEXED BY tickets_event_id WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_ticket(event_id: i64, data: &str) -> NewTicket {
        NewTicket {
            event_id,
            ticket_data: data.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_put_assigns_increasing_ids() {
        let store = Store::open_in_memory().await.unwrap();

        let first = store.put_event(NewEvent::new("A", "https://a.test/v")).await.unwrap();
        let second = store.put_event(NewEvent::new("B", "https://b.test/v")).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(store.get_event(first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = Store::open_in_memory().await.unwrap();
        let event = store.put_event(NewEvent::new("A", "https://a.test/v")).await.unwrap();

        let mut tx = store.begin(&[Collection::Events], TxMode::ReadWrite).await.unwrap();
        assert!(tx.delete_event(event.id).await.unwrap());
        tx.commit().await.unwrap();

        let next = store.put_event(NewEvent::new("B", "https://b.test/v")).await.unwrap();
        assert!(next.id > event.id);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = Store::open_in_memory().await.unwrap();
        assert_eq!(store.get_event(42).await.unwrap(), None);
        assert_eq!(store.get_ticket(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tickets_by_event_uses_only_matching_records() {
        let store = Store::open_in_memory().await.unwrap();
        let mut tx = store
            .begin(&[Collection::Tickets], TxMode::ReadWrite)
            .await
            .unwrap();
        tx.put_ticket(new_ticket(1, "a")).await.unwrap();
        tx.put_ticket(new_ticket(2, "b")).await.unwrap();
        tx.put_ticket(new_ticket(1, "c")).await.unwrap();
        tx.commit().await.unwrap();

        let tickets = store.tickets_by_event(1).await.unwrap();
        let data: Vec<_> = tickets.iter().map(|t| t.ticket_data.as_str()).collect();
        assert_eq!(data, vec!["a", "c"]);
        assert_eq!(store.all_tickets().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = Store::open_in_memory().await.unwrap();
        {
            let mut tx = store
                .begin(&[Collection::Events, Collection::Tickets], TxMode::ReadWrite)
                .await
                .unwrap();
            let event = tx.put_event(NewEvent::new("A", "https://a.test/v")).await.unwrap();
            tx.put_ticket(new_ticket(event.id, "x")).await.unwrap();
        }

        assert!(store.all_events().await.unwrap().is_empty());
        assert!(store.all_tickets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_scope_collection_is_refused() {
        let store = Store::open_in_memory().await.unwrap();
        let mut tx = store.begin(&[Collection::Events], TxMode::ReadWrite).await.unwrap();

        let err = tx.put_ticket(new_ticket(1, "x")).await.unwrap_err();
        assert!(matches!(err, StorageError::OutOfScope(Collection::Tickets)));
    }

    #[tokio::test]
    async fn test_read_only_transaction_refuses_writes() {
        let store = Store::open_in_memory().await.unwrap();
        let mut tx = store.begin(&[Collection::Events], TxMode::ReadOnly).await.unwrap();

        let err = tx
            .put_event(NewEvent::new("A", "https://a.test/v"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ReadOnly(Collection::Events)));
        assert!(tx.all_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = Store::open_in_memory().await.unwrap();
        assert!(!store.delete_ticket(99).await.unwrap());
        assert!(!store.delete_ticket(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_explicit_rollback_discards_writes() {
        let store = Store::open_in_memory().await.unwrap();
        let mut tx = store.begin(&[Collection::Events], TxMode::ReadWrite).await.unwrap();
        tx.put_event(NewEvent::new("A", "https://a.test/v")).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(store.all_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_ticket_for_event_requires_event() {
        let store = Store::open_in_memory().await.unwrap();
        let event = store.put_event(NewEvent::new("A", "https://a.test/v")).await.unwrap();

        let stored = store
            .put_ticket_for_event(new_ticket(event.id, "kept"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.event_id, event.id);

        let orphan = store.put_ticket_for_event(new_ticket(event.id + 1, "orphan")).await.unwrap();
        assert!(orphan.is_none());
        assert_eq!(store.all_tickets().await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_reopening_file_database_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("wallet.db").display());

        let event = {
            let store = Store::open(&url).await.unwrap();
            store.put_event(NewEvent::new("Kept", "https://k.test/v")).await.unwrap()
        };

        let store = Store::open(&url).await.unwrap();
        assert_eq!(store.get_event(event.id).await.unwrap(), Some(event));

        store.close().await;
        dir.close().unwrap();
    }
}
