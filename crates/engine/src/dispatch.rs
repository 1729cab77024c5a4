//! Ledger side effects of lifecycle transitions.
//!
//! The functions here only decide which entries a transition produces; they
//! never touch storage. Persisting them (and rejecting replays) is done by
//! the engine inside the transaction of the transition itself.

use chrono::{DateTime, Utc};

use crate::{
    Appointment, EffectKind, LedgerEntry, Machine, MachineRental, ResultEngine, Service, SourceKind,
};

/// Income recorded when a deposit is captured.
pub fn deposit_captured(
    appointment: &Appointment,
    service: &Service,
    occurred_at: DateTime<Utc>,
) -> ResultEngine<Option<LedgerEntry>> {
    let Some(amount_minor) = appointment.deposit_minor else {
        return Ok(None);
    };
    LedgerEntry::new(
        EffectKind::Deposit,
        SourceKind::Appointment,
        appointment.id,
        amount_minor,
        format!(
            "[DEPOSIT] {} - client {}",
            service.name, appointment.client_id
        ),
        occurred_at,
    )
    .map(Some)
}

/// Entries for an appointment that just reached `Completed`.
///
/// - the sale of the service, net of any deposit already booked
/// - the commission of the professional, when the service pays one
pub fn appointment_completed(
    appointment: &Appointment,
    service: &Service,
    occurred_at: DateTime<Utc>,
) -> ResultEngine<Vec<LedgerEntry>> {
    let mut entries = Vec::with_capacity(2);

    let remainder = appointment.remainder_minor();
    if remainder > 0 {
        entries.push(LedgerEntry::new(
            EffectKind::Completed,
            SourceKind::Appointment,
            appointment.id,
            remainder,
            format!("{} - client {}", service.name, appointment.client_id),
            occurred_at,
        )?);
    }

    if let Some(professional_id) = appointment.professional_id
        && let Some(commission) = service.commission_on(appointment.total_minor)?
    {
        entries.push(LedgerEntry::new(
            EffectKind::Commission,
            SourceKind::Appointment,
            appointment.id,
            commission,
            format!("Commission {} - professional {professional_id}", service.name),
            occurred_at,
        )?);
    }

    Ok(entries)
}

/// Expense recorded when a rental is billed. Free rentals produce nothing.
pub fn rental_billed(
    rental: &MachineRental,
    machine: &Machine,
    occurred_at: DateTime<Utc>,
) -> ResultEngine<Option<LedgerEntry>> {
    if rental.cost_minor == 0 {
        return Ok(None);
    }
    LedgerEntry::new(
        EffectKind::RentalBilled,
        SourceKind::Rental,
        rental.id,
        rental.cost_minor,
        format!("Rental {} - {}", machine.name, rental.date),
        occurred_at,
    )
    .map(Some)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone};
    use uuid::Uuid;

    use super::*;
    use crate::{AppointmentStatus, EntryKind};

    fn service(commission_bps: Option<i64>) -> Service {
        Service::new("Laser".to_string(), 60, 20_000, None, commission_bps).unwrap()
    }

    fn appointment(professional: Option<Uuid>, service: &Service) -> Appointment {
        let start = Utc.with_ymd_and_hms(2099, 1, 5, 10, 0, 0).unwrap();
        let mut appt = Appointment::new(
            professional,
            "client-7".to_string(),
            service.id,
            start.date_naive(),
            start,
            service.duration_minutes,
            service.price_minor,
            AppointmentStatus::Confirmed,
            start - Duration::days(1),
        )
        .unwrap();
        appt.transition(AppointmentStatus::Completed).unwrap();
        appt
    }

    #[test]
    fn completion_books_the_sale() {
        let service = service(None);
        let appt = appointment(None, &service);
        let entries = appointment_completed(&appt, &service, Utc::now()).unwrap();

        assert_eq!(entries.len(), 1);
        let sale = &entries[0];
        assert_eq!(sale.kind, EntryKind::Income);
        assert_eq!(sale.effect_kind, EffectKind::Completed);
        assert_eq!(sale.amount_minor, 20_000);
        assert_eq!(sale.category, "Servicios");
        assert_eq!(sale.source_id, appt.id);
    }

    #[test]
    fn completion_nets_out_the_deposit() {
        let service = service(None);
        let mut appt = appointment(None, &service);
        appt.deposit_minor = Some(5_000);
        let entries = appointment_completed(&appt, &service, Utc::now()).unwrap();
        assert_eq!(entries[0].amount_minor, 15_000);

        appt.deposit_minor = Some(20_000);
        assert!(
            appointment_completed(&appt, &service, Utc::now())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn commission_needs_an_assigned_professional() {
        let service = service(Some(3_000));
        let unassigned = appointment(None, &service);
        assert_eq!(
            appointment_completed(&unassigned, &service, Utc::now())
                .unwrap()
                .len(),
            1
        );

        let assigned = appointment(Some(Uuid::new_v4()), &service);
        let entries = appointment_completed(&assigned, &service, Utc::now()).unwrap();
        assert_eq!(entries.len(), 2);
        let commission = &entries[1];
        assert_eq!(commission.kind, EntryKind::Expense);
        assert_eq!(commission.category, "Salarios");
        assert_eq!(commission.amount_minor, 6_000);
    }

    #[test]
    fn commission_on_a_large_sale_is_exact() {
        let service = service(Some(5_000));
        let mut appt = appointment(Some(Uuid::new_v4()), &service);
        appt.total_minor = i64::MAX / 100;
        let entries = appointment_completed(&appt, &service, Utc::now()).unwrap();
        assert_eq!(entries[1].amount_minor, i64::MAX / 200);
    }

    #[test]
    fn deposit_entry_is_tagged() {
        let service = service(None);
        let mut appt = appointment(None, &service);
        assert_eq!(deposit_captured(&appt, &service, Utc::now()).unwrap(), None);

        appt.deposit_minor = Some(2_000);
        let entry = deposit_captured(&appt, &service, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(entry.effect_kind, EffectKind::Deposit);
        assert!(entry.description.starts_with("[DEPOSIT]"));
    }

    #[test]
    fn rental_expense_uses_the_rental_cost() {
        let machine = Machine::new("Laser X".to_string(), 30_000).unwrap();
        let date = NaiveDate::from_ymd_opt(2099, 1, 5).unwrap();
        let rental = MachineRental::new(machine.id, date, 28_000, None, Utc::now()).unwrap();
        let entry = rental_billed(&rental, &machine, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.amount_minor, 28_000);
        assert_eq!(entry.category, "Alquileres de Equipos");
        assert_eq!(entry.source_kind, SourceKind::Rental);

        let free = MachineRental::new(machine.id, date, 0, None, Utc::now()).unwrap();
        assert_eq!(rental_billed(&free, &machine, Utc::now()).unwrap(), None);
    }
}
