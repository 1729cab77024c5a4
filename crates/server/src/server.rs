use axum::{
    Router,
    routing::{get, post},
};
use axum_extra::headers::{Error as AxumError, Header};

use std::sync::Arc;

use crate::{appointments, catalog, ledger, rentals, slots};
use engine::Engine;

static OPERATOR_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-operator");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the staff member acting on a request.
///
/// Optional on every route. When present it is recorded as the author of the
/// ledger entries the request emits.
#[derive(Debug)]
pub(crate) struct Operator(pub String);

impl Header for Operator {
    fn name() -> &'static axum::http::HeaderName {
        &OPERATOR_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(Operator(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-operator header"),
        }
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/slots", get(slots::get))
        .route(
            "/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route("/appointments/{id}", get(appointments::get))
        .route(
            "/appointments/{id}/transition",
            post(appointments::transition),
        )
        .route(
            "/appointments/{id}/reschedule",
            post(appointments::reschedule),
        )
        .route("/appointments/{id}/deposit", post(appointments::deposit))
        .route("/appointments/{id}/paid", post(appointments::paid))
        .route("/rentals", get(rentals::list).post(rentals::create))
        .route("/rentals/pending", get(rentals::pending))
        .route("/rentals/{id}", get(rentals::get).patch(rentals::update))
        .route("/rentals/{id}/confirm", post(rentals::confirm))
        .route("/rentals/{id}/cancel", post(rentals::cancel))
        .route("/ledger", get(ledger::list))
        .route("/professionals", get(catalog::professionals))
        .route("/services", get(catalog::services))
        .route("/machines", get(catalog::machines))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
