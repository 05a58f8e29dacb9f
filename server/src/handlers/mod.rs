use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod events;
pub mod tickets;
pub mod wallet;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "ticket-wallet",
        version: env!("CARGO_PKG_VERSION"),
    };

    success(payload, "Health check successful")
}
