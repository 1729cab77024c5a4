//! Master data lookups.

use api_types::catalog::{MachinesResponse, ProfessionalsResponse, ServicesResponse};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState, views};

pub async fn professionals(
    State(state): State<ServerState>,
) -> Result<Json<ProfessionalsResponse>, ServerError> {
    let professionals = state.engine.professionals().await?;
    Ok(Json(ProfessionalsResponse {
        professionals: professionals.into_iter().map(views::professional).collect(),
    }))
}

pub async fn services(
    State(state): State<ServerState>,
) -> Result<Json<ServicesResponse>, ServerError> {
    let services = state.engine.services().await?;
    Ok(Json(ServicesResponse {
        services: services.into_iter().map(views::service).collect(),
    }))
}

pub async fn machines(
    State(state): State<ServerState>,
) -> Result<Json<MachinesResponse>, ServerError> {
    let machines = state.engine.machines().await?;
    Ok(Json(MachinesResponse {
        machines: machines.into_iter().map(views::machine).collect(),
    }))
}
