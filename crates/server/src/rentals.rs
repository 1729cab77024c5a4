//! Machine rental endpoints.

use api_types::{
    Created,
    rental::{
        PendingRentalList, PendingRentalsResponse, RentalList, RentalListResponse, RentalNew,
        RentalUpdate, RentalView,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use engine::{RentalListFilter, ScheduleRentalCmd, UpdateRentalCmd};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{Operator, ServerState},
    views,
};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RentalNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let mut cmd = ScheduleRentalCmd::new(payload.machine_id, payload.date);
    if let Some(cost_minor) = payload.cost_minor {
        cmd = cmd.cost_minor(cost_minor);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    let rental = state.engine.schedule_rental(cmd).await?;
    Ok((StatusCode::CREATED, Json(Created { id: rental.id })))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<RentalList>,
) -> Result<Json<RentalListResponse>, ServerError> {
    let rentals = state
        .engine
        .rentals(&RentalListFilter {
            machine_id: query.machine_id,
            from: query.from,
            to: query.to,
        })
        .await?;
    Ok(Json(RentalListResponse {
        rentals: rentals.into_iter().map(views::rental).collect(),
    }))
}

pub async fn pending(
    State(state): State<ServerState>,
    Query(query): Query<PendingRentalList>,
) -> Result<Json<PendingRentalsResponse>, ServerError> {
    let pending = state.engine.pending_rentals(query.from).await?;
    Ok(Json(PendingRentalsResponse {
        pending: pending.into_iter().map(views::pending_rental).collect(),
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(rental_id): Path<Uuid>,
) -> Result<Json<RentalView>, ServerError> {
    let rental = state.engine.rental(rental_id).await?;
    Ok(Json(views::rental(rental)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(rental_id): Path<Uuid>,
    Json(payload): Json<RentalUpdate>,
) -> Result<Json<RentalView>, ServerError> {
    if payload.cost_minor.is_none() && payload.notes.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of cost_minor or notes".to_string(),
        ));
    }
    let rental = state
        .engine
        .update_rental(
            rental_id,
            UpdateRentalCmd {
                cost_minor: payload.cost_minor,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(views::rental(rental)))
}

pub async fn confirm(
    State(state): State<ServerState>,
    operator: Option<TypedHeader<Operator>>,
    Path(rental_id): Path<Uuid>,
) -> Result<Json<RentalView>, ServerError> {
    let operator = operator.as_ref().map(|header| header.0.0.as_str());
    let rental = state.engine.confirm_rental(rental_id, operator).await?;
    Ok(Json(views::rental(rental)))
}

pub async fn cancel(
    State(state): State<ServerState>,
    Path(rental_id): Path<Uuid>,
) -> Result<Json<RentalView>, ServerError> {
    let rental = state.engine.cancel_rental(rental_id).await?;
    Ok(Json(views::rental(rental)))
}
