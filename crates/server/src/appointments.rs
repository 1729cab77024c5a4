//! Appointment endpoints.

use api_types::{
    Created,
    appointment::{
        AppointmentList, AppointmentListResponse, AppointmentNew, AppointmentReschedule,
        AppointmentTransition, AppointmentView, DepositNew, TransitionResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use engine::{AppointmentListFilter, CreateAppointmentCmd, RescheduleCmd};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{Operator, ServerState},
    views,
};

fn operator_name(operator: &Option<TypedHeader<Operator>>) -> Option<&str> {
    operator.as_ref().map(|header| header.0.0.as_str())
}

pub async fn create(
    State(state): State<ServerState>,
    operator: Option<TypedHeader<Operator>>,
    Json(payload): Json<AppointmentNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let mut cmd = CreateAppointmentCmd::new(
        payload.client_id,
        payload.service_id,
        payload.start_at.with_timezone(&Utc),
    );
    if let Some(professional_id) = payload.professional_id {
        cmd = cmd.professional_id(professional_id);
    }
    if let Some(status) = payload.status {
        cmd = cmd.status(views::appointment_status_in(status)?);
    }
    if let Some(deposit_minor) = payload.deposit_minor {
        cmd = cmd.deposit_minor(deposit_minor);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    if let Some(operator) = operator_name(&operator) {
        cmd = cmd.created_by(operator);
    }

    let appointment = state.engine.create_appointment(cmd).await?;
    Ok((StatusCode::CREATED, Json(Created { id: appointment.id })))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AppointmentList>,
) -> Result<Json<AppointmentListResponse>, ServerError> {
    let appointments = state
        .engine
        .appointments(&AppointmentListFilter {
            professional_id: query.professional_id,
            from: query.from,
            to: query.to,
            statuses: None,
        })
        .await?;

    Ok(Json(AppointmentListResponse {
        appointments: appointments.into_iter().map(views::appointment).collect(),
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentView>, ServerError> {
    let appointment = state.engine.appointment(appointment_id).await?;
    Ok(Json(views::appointment(appointment)))
}

pub async fn transition(
    State(state): State<ServerState>,
    operator: Option<TypedHeader<Operator>>,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<AppointmentTransition>,
) -> Result<Json<TransitionResponse>, ServerError> {
    let to = views::appointment_status_in(payload.to)?;
    let outcome = state
        .engine
        .transition_appointment(appointment_id, to, operator_name(&operator))
        .await?;
    Ok(Json(views::transition(outcome)))
}

pub async fn reschedule(
    State(state): State<ServerState>,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<AppointmentReschedule>,
) -> Result<Json<AppointmentView>, ServerError> {
    let mut cmd = RescheduleCmd::new(appointment_id, payload.start_at.with_timezone(&Utc));
    if let Some(professional_id) = payload.professional_id {
        cmd = cmd.professional_id(professional_id);
    }
    let appointment = state.engine.reschedule_appointment(cmd).await?;
    Ok(Json(views::appointment(appointment)))
}

pub async fn deposit(
    State(state): State<ServerState>,
    operator: Option<TypedHeader<Operator>>,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<DepositNew>,
) -> Result<Json<AppointmentView>, ServerError> {
    let appointment = state
        .engine
        .record_deposit(
            appointment_id,
            payload.amount_minor,
            operator_name(&operator),
        )
        .await?;
    Ok(Json(views::appointment(appointment)))
}

pub async fn paid(
    State(state): State<ServerState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentView>, ServerError> {
    let appointment = state.engine.mark_paid(appointment_id).await?;
    Ok(Json(views::appointment(appointment)))
}
