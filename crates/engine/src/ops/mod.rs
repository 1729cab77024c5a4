use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::{AppointmentStatus, EngineError, ResultEngine, locks::KeyedLocks};

mod appointments;
mod availability;
mod catalog;
mod ledger;
mod lookups;
mod rentals;

pub use appointments::{AppointmentListFilter, PendingRentalWarning, TransitionOutcome};
pub use rentals::{PendingRental, RentalListFilter};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Scheduling engine.
///
/// Every operation is request scoped: it reads the authoritative store, keeps
/// nothing cached, and writes inside a single DB transaction. Critical
/// sections are serialised by keyed locks taken before the transaction
/// begins.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    timezone: Tz,
    default_status: AppointmentStatus,
    locks: KeyedLocks,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Timezone business dates and working hours are expressed in.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn default_status(&self) -> AppointmentStatus {
        self.default_status
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    timezone: Option<Tz>,
    default_status: Option<AppointmentStatus>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Business timezone. Defaults to UTC.
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = Some(timezone);
        self
    }

    /// Status of new appointments: `Pending` (default) or `Confirmed`.
    pub fn default_status(mut self, status: AppointmentStatus) -> EngineBuilder {
        self.default_status = Some(status);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let default_status = self.default_status.unwrap_or(AppointmentStatus::Pending);
        if !default_status.blocks_agenda() {
            return Err(EngineError::InvalidTransition(format!(
                "default status must be pending or confirmed, got {}",
                default_status.as_str()
            )));
        }
        Ok(Engine {
            database: self.database,
            timezone: self.timezone.unwrap_or(chrono_tz::UTC),
            default_status,
            locks: KeyedLocks::default(),
        })
    }
}
