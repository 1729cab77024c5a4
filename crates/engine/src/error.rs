//! The module contains the error the engine can throw.
//!
//! The scheduling errors are:
//!
//! - [`InvalidTransition`] thrown when a state machine is asked for an illegal
//!   change (appointment status, payment status, rental status).
//! - [`SlotNoLongerAvailable`] thrown when a booking loses the race for a slot.
//! - [`RentalLocked`] thrown on any mutation of a billed rental.
//! - [`DuplicateSideEffect`] raised by the ledger dispatcher when an effect was
//!   already emitted. It never leaves the engine.
//!
//!  [`InvalidTransition`]: EngineError::InvalidTransition
//!  [`SlotNoLongerAvailable`]: EngineError::SlotNoLongerAvailable
//!  [`RentalLocked`]: EngineError::RentalLocked
//!  [`DuplicateSideEffect`]: EngineError::DuplicateSideEffect
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Slot no longer available: {0}")]
    SlotNoLongerAvailable(String),
    #[error("Rental locked: {0}")]
    RentalLocked(String),
    #[error("Duplicate side effect: {0}")]
    DuplicateSideEffect(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::SlotNoLongerAvailable(a), Self::SlotNoLongerAvailable(b)) => a == b,
            (Self::RentalLocked(a), Self::RentalLocked(b)) => a == b,
            (Self::DuplicateSideEffect(a), Self::DuplicateSideEffect(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidSchedule(a), Self::InvalidSchedule(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl EngineError {
    /// Return `true` for errors caused by losing a race or hitting a lock.
    ///
    /// These are surfaced to the caller as-is and are never partial: the
    /// transaction that raised them has been rolled back.
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            Self::SlotNoLongerAvailable(_) | Self::RentalLocked(_) | Self::ExistingKey(_)
        )
    }
}
