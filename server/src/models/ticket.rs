use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted ticket. Everything except `event_id` and `ticket_data` comes from
/// the validation endpoint and is frozen at ingestion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    #[serde(rename = "eventId")]
    pub event_id: i64,
    pub ticket_data: String,
    pub ticket_name: Option<String>,
    pub ticket_number: Option<String>,
    pub ticket_state: Option<String>,
    pub entry_time: Option<String>,
}

impl Ticket {
    /// Label for list views; falls back to the raw payload when the endpoint sent no name.
    pub fn display_name(&self) -> &str {
        self.ticket_name.as_deref().unwrap_or(&self.ticket_data)
    }
}

/// Ticket fields before storage assigns an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    #[serde(rename = "eventId")]
    pub event_id: i64,
    pub ticket_data: String,
    pub ticket_name: Option<String>,
    pub ticket_number: Option<String>,
    pub ticket_state: Option<String>,
    pub entry_time: Option<String>,
}

impl NewTicket {
    pub(crate) fn with_id(self, id: i64) -> Ticket {
        Ticket {
            id,
            event_id: self.event_id,
            ticket_data: self.ticket_data,
            ticket_name: self.ticket_name,
            ticket_number: self.ticket_number,
            ticket_state: self.ticket_state,
            entry_time: self.entry_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(name: Option<&str>) -> Ticket {
        NewTicket {
            event_id: 1,
            ticket_data: "RAW-PAYLOAD".to_string(),
            ticket_name: name.map(str::to_string),
            ..Default::default()
        }
        .with_id(7)
    }

    #[test]
    fn test_display_name_prefers_ticket_name() {
        assert_eq!(ticket(Some("VIP Pass")).display_name(), "VIP Pass");
    }

    #[test]
    fn test_display_name_falls_back_to_payload() {
        assert_eq!(ticket(None).display_name(), "RAW-PAYLOAD");
    }

    #[test]
    fn test_serializes_event_id_with_layout_name() {
        let value = serde_json::to_value(ticket(None)).unwrap();
        assert_eq!(value["eventId"], 1);
        assert_eq!(value["id"], 7);
        assert!(value.get("event_id").is_none());
    }
}
