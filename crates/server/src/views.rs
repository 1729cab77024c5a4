//! Conversions between engine values and API bodies.

use api_types::{
    appointment::{self as api_appointment, AppointmentView, PendingRentalWarning, TransitionResponse},
    catalog::{MachineView, ProfessionalView, ServiceView},
    ledger::{self as api_ledger, LedgerEntryView},
    rental::{self as api_rental, PendingRentalView, RentalView},
    slot::SlotView,
};
use engine::{
    Appointment, AppointmentStatus, EntryKind, LedgerEntry, Machine, MachineRental, PaymentStatus,
    PendingRental, Professional, RentalStatus, Service, Slot, TransitionOutcome,
};

use crate::ServerError;

pub fn slot(slot: &Slot) -> SlotView {
    SlotView {
        start: slot.start,
        end: slot.end,
    }
}

pub fn appointment_status_in(
    status: api_appointment::AppointmentStatus,
) -> Result<AppointmentStatus, ServerError> {
    Ok(AppointmentStatus::try_from(status.as_str())?)
}

fn appointment_status_out(status: AppointmentStatus) -> api_appointment::AppointmentStatus {
    match status {
        AppointmentStatus::Pending => api_appointment::AppointmentStatus::Pending,
        AppointmentStatus::Confirmed => api_appointment::AppointmentStatus::Confirmed,
        AppointmentStatus::Completed => api_appointment::AppointmentStatus::Completed,
        AppointmentStatus::Cancelled => api_appointment::AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow => api_appointment::AppointmentStatus::NoShow,
    }
}

fn payment_status_out(status: PaymentStatus) -> api_appointment::PaymentStatus {
    match status {
        PaymentStatus::Pending => api_appointment::PaymentStatus::Pending,
        PaymentStatus::Deposit => api_appointment::PaymentStatus::Deposit,
        PaymentStatus::Paid => api_appointment::PaymentStatus::Paid,
    }
}

fn rental_status_out(status: RentalStatus) -> api_rental::RentalStatus {
    match status {
        RentalStatus::Scheduled => api_rental::RentalStatus::Scheduled,
        RentalStatus::Confirmed => api_rental::RentalStatus::Confirmed,
        RentalStatus::Billed => api_rental::RentalStatus::Billed,
        RentalStatus::Cancelled => api_rental::RentalStatus::Cancelled,
    }
}

pub fn appointment(appointment: Appointment) -> AppointmentView {
    AppointmentView {
        id: appointment.id,
        professional_id: appointment.professional_id,
        client_id: appointment.client_id,
        service_id: appointment.service_id,
        date: appointment.date,
        start_at: appointment.start_at,
        end_at: appointment.end_at,
        status: appointment_status_out(appointment.status),
        payment_status: payment_status_out(appointment.payment_status),
        deposit_minor: appointment.deposit_minor,
        total_minor: appointment.total_minor,
        notes: appointment.notes,
        reminder_24h_sent: appointment.reminder_24h_sent,
        reminder_2h_sent: appointment.reminder_2h_sent,
        created_by: appointment.created_by,
    }
}

pub fn transition(outcome: TransitionOutcome) -> TransitionResponse {
    TransitionResponse {
        appointment: appointment(outcome.appointment),
        ledger_entry_ids: outcome.ledger_entry_ids,
        billed_rental_id: outcome.billed_rental_id,
        pending_rental: outcome.pending_rental.map(|warning| PendingRentalWarning {
            machine_id: warning.machine_id,
            date: warning.date,
            rental_id: warning.rental_id,
            rental_status: warning.rental_status.map(rental_status_out),
        }),
    }
}

pub fn rental(rental: MachineRental) -> RentalView {
    RentalView {
        id: rental.id,
        machine_id: rental.machine_id,
        date: rental.date,
        status: rental_status_out(rental.status),
        cost_minor: rental.cost_minor,
        notes: rental.notes,
        expense_transaction_id: rental.expense_transaction_id,
    }
}

pub fn pending_rental(pending: PendingRental) -> PendingRentalView {
    PendingRentalView {
        machine_id: pending.machine_id,
        machine_name: pending.machine_name,
        date: pending.date,
        appointment_count: pending.appointment_count,
        daily_cost_minor: pending.daily_cost_minor,
        rental_id: pending.rental_id,
        rental_status: pending.rental_status.map(rental_status_out),
    }
}

pub fn ledger_entry(entry: LedgerEntry) -> LedgerEntryView {
    LedgerEntryView {
        id: entry.id,
        kind: match entry.kind {
            EntryKind::Income => api_ledger::EntryKind::Income,
            EntryKind::Expense => api_ledger::EntryKind::Expense,
        },
        amount_minor: entry.amount_minor,
        category: entry.category,
        description: entry.description,
        source_id: entry.source_id,
        effect_kind: entry.effect_kind.as_str().to_string(),
        occurred_at: entry.occurred_at,
        created_by: entry.created_by,
    }
}

pub fn professional(professional: Professional) -> ProfessionalView {
    ProfessionalView {
        id: professional.id,
        name: professional.name,
        working_days: professional.working_days.to_codes(),
        work_start: professional.work_start,
        work_end: professional.work_end,
        slot_interval_minutes: professional.slot_interval.minutes(),
    }
}

pub fn service(service: Service) -> ServiceView {
    ServiceView {
        id: service.id,
        name: service.name,
        duration_minutes: service.duration_minutes,
        price_minor: service.price_minor,
        machine_id: service.machine_id,
        commission_bps: service.commission_bps,
    }
}

pub fn machine(machine: Machine) -> MachineView {
    MachineView {
        id: machine.id,
        name: machine.name,
        daily_cost_minor: machine.daily_cost_minor,
    }
}
