use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{self, events, tickets, wallet};
use crate::state::AppState;

/// Builds the wallet API.
///
/// - `GET /health`
/// - `GET /wallet?event_id=`
/// - `GET|POST /events`, `POST /events/scan`
/// - `GET|DELETE /events/:id`
/// - `GET|POST /events/:id/tickets`
/// - `GET|DELETE /tickets/:id`
pub fn create_routes(state: AppState, config: &Config) -> Router {
    // Ticket payloads are admission credentials and must not be cached.
    let ticket_routes = Router::new()
        .route(
            "/events/:id/tickets",
            get(tickets::list_for_event).post(tickets::add),
        )
        .route("/tickets/:id", get(tickets::get).delete(tickets::delete))
        .route("/wallet", get(wallet::show))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/events", get(events::list).post(events::create))
        .route("/events/scan", axum::routing::post(events::scan))
        .route("/events/:id", get(events::get).delete(events::delete))
        .merge(ticket_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.allowed_origins))
}
