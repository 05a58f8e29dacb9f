//! Event registration, lookup and default selection.

use reqwest::Url;

use crate::error::WalletError;
use crate::models::{Event, NewEvent};
use crate::storage::Store;

/// Separator between the event name and its endpoint in a scanned event code.
pub const EVENT_PAYLOAD_SEPARATOR: char = '@';

/// Splits a scanned `name@apiUrl` code. Exactly one separator is accepted.
pub fn parse_event_payload(payload: &str) -> Result<NewEvent, WalletError> {
    let mut parts = payload.split(EVENT_PAYLOAD_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(api_url), None) => Ok(NewEvent::new(name, api_url)),
        _ => Err(WalletError::validation(format!(
            "Malformed event code, expected <name>@<apiUrl>: {payload}"
        ))),
    }
}

fn validate_new_event(event: &NewEvent) -> Result<(), WalletError> {
    if event.name.trim().is_empty() {
        return Err(WalletError::validation("Event name must not be empty"));
    }
    if event.api_url.trim().is_empty() {
        return Err(WalletError::validation("Event apiUrl must not be empty"));
    }

    let url = Url::parse(&event.api_url).map_err(|e| {
        WalletError::validation(format!("Event apiUrl '{}' is not a URL: {e}", event.api_url))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(WalletError::validation(format!(
            "Event apiUrl must use http or https, got '{scheme}'"
        ))),
    }
}

pub async fn create_event(
    store: &Store,
    name: impl Into<String>,
    api_url: impl Into<String>,
) -> Result<Event, WalletError> {
    let new_event = NewEvent::new(name, api_url);
    validate_new_event(&new_event)?;

    let event = store.put_event(new_event).await?;
    tracing::info!(event_id = event.id, name = %event.name, "Event registered");
    Ok(event)
}

/// Registers an event from a scanned or typed `name@apiUrl` code.
pub async fn create_event_from_payload(store: &Store, payload: &str) -> Result<Event, WalletError> {
    let parsed = parse_event_payload(payload).map_err(|e| {
        tracing::warn!(payload = %payload, "Rejected malformed event code");
        e
    })?;
    create_event(store, parsed.name, parsed.api_url).await
}

pub async fn list_events(store: &Store) -> Result<Vec<Event>, WalletError> {
    Ok(store.all_events().await?)
}

pub async fn get_event(store: &Store, id: i64) -> Result<Option<Event>, WalletError> {
    Ok(store.get_event(id).await?)
}

/// The most recently created event, i.e. the one with the greatest id.
pub fn select_latest(events: &[Event]) -> Option<&Event> {
    events.iter().max_by_key(|event| event.id)
}

/// Honors an explicit selection when it still names an existing event,
/// otherwise falls back to [`select_latest`].
pub fn resolve_selection(events: &[Event], requested: Option<i64>) -> Option<&Event> {
    requested
        .and_then(|id| events.iter().find(|event| event.id == id))
        .or_else(|| select_latest(events))
}
