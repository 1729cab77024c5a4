use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};

mod appointments;
mod catalog;
mod ledger;
mod rentals;
mod server;
mod slots;
mod views;

pub mod types {
    pub mod slot {
        pub use api_types::slot::{SlotView, SlotsQuery, SlotsResponse};
    }

    pub mod appointment {
        pub use api_types::appointment::{
            AppointmentList, AppointmentListResponse, AppointmentNew, AppointmentReschedule,
            AppointmentStatus, AppointmentTransition, AppointmentView, DepositNew, PaymentStatus,
            PendingRentalWarning, TransitionResponse,
        };
    }

    pub mod rental {
        pub use api_types::rental::{
            PendingRentalList, PendingRentalView, PendingRentalsResponse, RentalList,
            RentalListResponse, RentalNew, RentalStatus, RentalUpdate, RentalView,
        };
    }

    pub mod ledger {
        pub use api_types::ledger::{EntryKind, LedgerEntryView, LedgerQuery, LedgerResponse};
    }

    pub mod catalog {
        pub use api_types::catalog::{
            MachineView, MachinesResponse, ProfessionalView, ProfessionalsResponse, ServiceView,
            ServicesResponse,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::SlotNoLongerAvailable(_) => StatusCode::CONFLICT,
        EngineError::RentalLocked(_) => StatusCode::LOCKED,
        EngineError::Database(_) | EngineError::DuplicateSideEffect(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidTransition(_)
        | EngineError::InvalidSchedule(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::DuplicateSideEffect(id) => {
            tracing::error!("side effect {id} escaped the dispatcher");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflicts_map_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res =
            ServerError::from(EngineError::SlotNoLongerAvailable("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn rental_locked_maps_to_423() {
        let res = ServerError::from(EngineError::RentalLocked("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::LOCKED);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::InvalidTransition("x".to_string()),
            EngineError::InvalidSchedule("x".to_string()),
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InvalidId("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn database_errors_are_hidden() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("secret table".to_string()));
        assert_eq!(
            message_for_engine_error(err),
            "internal server error".to_string()
        );
        let res = ServerError::from(EngineError::DuplicateSideEffect("x".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
