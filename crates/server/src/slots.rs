//! Availability endpoint.

use api_types::slot::{SlotsQuery, SlotsResponse};
use axum::{
    Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState, views};

pub async fn get(
    State(state): State<ServerState>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, ServerError> {
    let slots = state
        .engine
        .available_slots(
            query.professional_id,
            query.date,
            query.service_id,
            query.exclude_appointment_id,
        )
        .await?;

    Ok(Json(SlotsResponse {
        slots: slots.iter().map(views::slot).collect(),
    }))
}
