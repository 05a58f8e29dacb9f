use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::WalletError;

/// Query parameter carrying the scanned payload to the validation endpoint.
pub const TICKET_DATA_PARAM: &str = "ticket_data";

/// Ticket fields the validation endpoint is allowed to supply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TicketFields {
    #[serde(default)]
    pub ticket_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_integer")]
    pub ticket_number: Option<String>,
    #[serde(default)]
    pub ticket_state: Option<String>,
    #[serde(default)]
    pub entry_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReply {
    Accepted(TicketFields),
    Rejected,
}

/// Asks an event's validation endpoint about a ticket payload.
#[async_trait]
pub trait TicketValidator: Send + Sync {
    async fn validate(&self, api_url: &str, ticket_data: &str) -> Result<ValidationReply, WalletError>;
}

/// [`TicketValidator`] that performs `GET <apiUrl>?ticket_data=<payload>`.
#[derive(Clone)]
pub struct HttpValidator {
    client: reqwest::Client,
}

impl HttpValidator {
    pub fn new(timeout: Duration) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::endpoint(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client))
    }

    /// Uses a preconfigured client; its timeout is the only bound on a validation call.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TicketValidator for HttpValidator {
    async fn validate(&self, api_url: &str, ticket_data: &str) -> Result<ValidationReply, WalletError> {
        let mut url = Url::parse(api_url)
            .map_err(|e| WalletError::endpoint(format!("Invalid endpoint URL '{api_url}': {e}")))?;
        url.query_pairs_mut().append_pair(TICKET_DATA_PARAM, ticket_data);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WalletError::endpoint(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| WalletError::endpoint(format!("Failed to read response: {e}")))?;

        tracing::debug!(status = %status, bytes = body.len(), "Validation endpoint responded");
        parse_reply(status.is_success(), &body)
    }
}

/// Interprets a validation endpoint response body.
///
/// A truthy `error` member is a rejection whatever the HTTP status. Otherwise the
/// status must be a success and the body must match [`TicketFields`].
pub fn parse_reply(success: bool, body: &[u8]) -> Result<ValidationReply, WalletError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| WalletError::endpoint(format!("Response is not JSON: {e}")))?;

    let Value::Object(ref members) = value else {
        return Err(WalletError::endpoint("Response is not a JSON object"));
    };

    if members.get("error").is_some_and(is_truthy) {
        return Ok(ValidationReply::Rejected);
    }
    if !success {
        return Err(WalletError::endpoint(
            "Endpoint returned an error status without a rejection body",
        ));
    }

    let fields = TicketFields::deserialize(value)
        .map_err(|e| WalletError::endpoint(format!("Unexpected response field type: {e}")))?;
    Ok(ValidationReply::Accepted(fields))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn string_or_integer<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or integer, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_error_is_rejection() {
        for body in [
            r#"{"error": "invalid ticket"}"#,
            r#"{"error": true}"#,
            r#"{"error": 1}"#,
            r#"{"error": {"code": 4}}"#,
        ] {
            assert_eq!(
                parse_reply(true, body.as_bytes()).unwrap(),
                ValidationReply::Rejected,
                "body {body}"
            );
        }
    }

    #[test]
    fn test_falsy_error_is_accepted() {
        for body in [
            r#"{"error": null, "ticket_state": "0"}"#,
            r#"{"error": false, "ticket_state": "0"}"#,
            r#"{"error": "", "ticket_state": "0"}"#,
            r#"{"error": 0, "ticket_state": "0"}"#,
        ] {
            assert!(matches!(
                parse_reply(true, body.as_bytes()).unwrap(),
                ValidationReply::Accepted(_)
            ));
        }
    }

    #[test]
    fn test_rejection_wins_over_error_status() {
        let reply = parse_reply(false, br#"{"error": "unknown ticket"}"#).unwrap();
        assert_eq!(reply, ValidationReply::Rejected);
    }

    #[test]
    fn test_error_status_without_rejection_is_fault() {
        let err = parse_reply(false, br#"{"ticket_state": "0"}"#).unwrap_err();
        assert!(matches!(err, WalletError::ValidationEndpoint(_)));
    }

    #[test]
    fn test_accepted_fields() {
        let body = br#"{
            "ticket_name": "Weekend Pass",
            "ticket_number": 1024,
            "ticket_state": "1",
            "entry_time": "2024-08-01 10:02",
            "seat": "ignored"
        }"#;

        let ValidationReply::Accepted(fields) = parse_reply(true, body).unwrap() else {
            panic!("expected acceptance");
        };
        assert_eq!(fields.ticket_name.as_deref(), Some("Weekend Pass"));
        assert_eq!(fields.ticket_number.as_deref(), Some("1024"));
        assert_eq!(fields.ticket_state.as_deref(), Some("1"));
        assert_eq!(fields.entry_time.as_deref(), Some("2024-08-01 10:02"));
    }

    #[test]
    fn test_wrong_field_types_are_faults() {
        for body in [
            r#"{"ticket_state": 0}"#,
            r#"{"ticket_name": ["a"]}"#,
            r#"{"ticket_number": 1.5}"#,
            r#"{"entry_time": false}"#,
        ] {
            assert!(
                matches!(
                    parse_reply(true, body.as_bytes()),
                    Err(WalletError::ValidationEndpoint(_))
                ),
                "body {body}"
            );
        }
    }

    #[test]
    fn test_malformed_bodies_are_faults() {
        for body in ["<html>oops</html>", "[1, 2]", "\"ok\"", ""] {
            assert!(matches!(
                parse_reply(true, body.as_bytes()),
                Err(WalletError::ValidationEndpoint(_))
            ));
        }
    }

    #[test]
    fn test_empty_object_is_accepted_with_no_fields() {
        let reply = parse_reply(true, b"{}").unwrap();
        assert_eq!(reply, ValidationReply::Accepted(TicketFields::default()));
    }
}
