use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered event and the validation endpoint its tickets are checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    #[serde(rename = "apiUrl")]
    pub api_url: String,
}

/// Event fields before storage assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    #[serde(rename = "apiUrl")]
    pub api_url: String,
}

impl NewEvent {
    pub fn new(name: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_url: api_url.into(),
        }
    }

    pub(crate) fn with_id(self, id: i64) -> Event {
        Event {
            id,
            name: self.name,
            api_url: self.api_url,
        }
    }
}
