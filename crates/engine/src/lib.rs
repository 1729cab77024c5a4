pub use appointments::{Appointment, AppointmentStatus, PaymentStatus, ReminderKind};
pub use calendar::{WorkingDay, working_day};
pub use commands::{
    CreateAppointmentCmd, NewProfessionalCmd, NewServiceCmd, RescheduleCmd, ScheduleRentalCmd,
    UpdateRentalCmd,
};
pub use conflicts::{Booking, available_slots, first_conflict, overlaps};
pub use error::EngineError;
pub use ledger::{EffectKind, EntryKind, LedgerEntry, SourceKind};
pub use machines::Machine;
pub use ops::{
    AppointmentListFilter, Engine, EngineBuilder, PendingRental, PendingRentalWarning,
    RentalListFilter, TransitionOutcome,
};
pub use professionals::{Professional, SlotInterval, WorkingDays};
pub use rentals::{MachineRental, RentalStatus};
pub use services::{MAX_DURATION_MINUTES, MAX_PRICE_MINOR, Service};
pub use slots::{Slot, SlotGenerator};

mod appointments;
mod calendar;
mod commands;
mod conflicts;
pub mod dispatch;
mod error;
mod ledger;
mod locks;
mod machines;
mod ops;
mod professionals;
mod rentals;
mod services;
mod slots;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
