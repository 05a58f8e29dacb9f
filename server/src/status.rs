//! Display status of a stored ticket.
//!
//! [`resolve`] is the only place that decides whether a ticket's redeemable code
//! may be shown. It is shown for unchecked tickets and never otherwise.

use serde::Serialize;

use crate::models::Ticket;

pub const INVALID_TICKET_WARNING: &str = "This ticket is not valid for entry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketCategory {
    Unchecked,
    CheckedIn,
    Blacklisted,
    Unsold,
    /// Any state code outside `0..=3`, including a missing one. Stored verbatim.
    Unknown,
}

impl TicketCategory {
    pub fn from_state(state: Option<&str>) -> Self {
        match state {
            Some("0") => TicketCategory::Unchecked,
            Some("1") => TicketCategory::CheckedIn,
            Some("2") => TicketCategory::Blacklisted,
            Some("3") => TicketCategory::Unsold,
            _ => TicketCategory::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketCategory::Unchecked => "Not checked in",
            TicketCategory::CheckedIn => "Checked in",
            TicketCategory::Blacklisted => "Blacklisted",
            TicketCategory::Unsold => "Unsold",
            TicketCategory::Unknown => "Unknown status",
        }
    }

    pub fn shows_code(&self) -> bool {
        matches!(self, TicketCategory::Unchecked)
    }

    fn warning(&self) -> Option<&'static str> {
        match self {
            TicketCategory::Unchecked | TicketCategory::CheckedIn => None,
            TicketCategory::Blacklisted | TicketCategory::Unsold | TicketCategory::Unknown => {
                Some(INVALID_TICKET_WARNING)
            }
        }
    }
}

/// What the ticket detail view may render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketStatus {
    pub category: TicketCategory,
    pub label: &'static str,
    pub redeemable_code: Option<String>,
    pub entry_time: Option<String>,
    pub warning: Option<&'static str>,
}

pub fn resolve(ticket: &Ticket) -> TicketStatus {
    let category = TicketCategory::from_state(ticket.ticket_state.as_deref());

    TicketStatus {
        category,
        label: category.label(),
        redeemable_code: category.shows_code().then(|| ticket.ticket_data.clone()),
        entry_time: ticket.entry_time.clone().filter(|t| !t.is_empty()),
        warning: category.warning(),
    }
}

/// One row of a ticket list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketCard {
    pub id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub category: TicketCategory,
}

impl From<&Ticket> for TicketCard {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.display_name().to_string(),
            subtitle: ticket.ticket_number.clone(),
            category: TicketCategory::from_state(ticket.ticket_state.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(state: Option<&str>) -> Ticket {
        Ticket {
            id: 1,
            event_id: 1,
            ticket_data: "CODE-123".to_string(),
            ticket_name: None,
            ticket_number: Some("A-7".to_string()),
            ticket_state: state.map(str::to_string),
            entry_time: Some("2024-08-01 10:02".to_string()),
        }
    }

    #[test]
    fn test_unchecked_shows_code() {
        let status = resolve(&ticket(Some("0")));
        assert_eq!(status.category, TicketCategory::Unchecked);
        assert_eq!(status.redeemable_code.as_deref(), Some("CODE-123"));
        assert_eq!(status.warning, None);
    }

    #[test]
    fn test_code_hidden_for_every_other_state() {
        for state in [Some("1"), Some("2"), Some("3"), Some("9"), Some(""), Some(" 0"), None] {
            let status = resolve(&ticket(state));
            assert_eq!(status.redeemable_code, None, "state {state:?}");
        }
    }

    #[test]
    fn test_checked_in_keeps_entry_time_without_warning() {
        let status = resolve(&ticket(Some("1")));
        assert_eq!(status.category, TicketCategory::CheckedIn);
        assert_eq!(status.entry_time.as_deref(), Some("2024-08-01 10:02"));
        assert_eq!(status.warning, None);
    }

    #[test]
    fn test_invalid_states_warn() {
        let cases = [
            ("2", TicketCategory::Blacklisted),
            ("3", TicketCategory::Unsold),
            ("9", TicketCategory::Unknown),
        ];
        for (state, category) in cases {
            let status = resolve(&ticket(Some(state)));
            assert_eq!(status.category, category);
            assert_eq!(status.warning, Some(INVALID_TICKET_WARNING));
        }
    }

    #[test]
    fn test_card_falls_back_to_payload() {
        let card = TicketCard::from(&ticket(Some("0")));
        assert_eq!(card.title, "CODE-123");
        assert_eq!(card.subtitle.as_deref(), Some("A-7"));
    }

    #[test]
    fn test_category_serializes_kebab_case() {
        let value = serde_json::to_value(TicketCategory::CheckedIn).unwrap();
        assert_eq!(value, "checked-in");
    }
}
