use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::state::AppState;
use crate::utils::response::success;
use crate::utils::AppError;
use crate::view::WalletView;

#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    pub event_id: Option<i64>,
}

/// `GET /wallet?event_id=` — events, the effective selection and its tickets.
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<SelectionQuery>,
) -> Result<Response, AppError> {
    let view = WalletView::load(&state.store, query.event_id).await?;
    Ok(success(view, "Wallet loaded"))
}
