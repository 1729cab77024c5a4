use api_types::ledger::{LedgerQuery, LedgerResponse};
use axum::{
    Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<LedgerResponse>, ServerError> {
    let entries = state.engine.ledger_entries(query.source_id).await?;
    Ok(Json(LedgerResponse {
        entries: entries.into_iter().map(views::ledger_entry).collect(),
    }))
}
