use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Appointment, AppointmentStatus, CreateAppointmentCmd, EngineError, MachineRental,
    Professional, ReminderKind, RentalStatus, RescheduleCmd, ResultEngine, Service, appointments,
    dispatch, first_conflict,
    locks::LockKey,
    util::{local_date, normalize_optional_text},
    working_day,
};

use super::{Engine, with_tx};

/// Filters for listing appointments.
///
/// `from` and `to` are inclusive business dates.
#[derive(Clone, Debug, Default)]
pub struct AppointmentListFilter {
    pub professional_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// If present, acts as an allow-list of statuses to return.
    pub statuses: Option<Vec<AppointmentStatus>>,
}

/// An appointment completed without a confirmed rental for its machine.
///
/// The completion stands; the group shows up in the pending rentals report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingRentalWarning {
    pub appointment_id: Uuid,
    pub machine_id: Uuid,
    pub date: NaiveDate,
    pub rental_id: Option<Uuid>,
    pub rental_status: Option<RentalStatus>,
}

/// Result of a status transition and the side effects it fired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub appointment: Appointment,
    /// Ledger entries emitted (or found already emitted) by the transition.
    pub ledger_entry_ids: Vec<Uuid>,
    /// Rental moved to `Billed` by this completion.
    pub billed_rental_id: Option<Uuid>,
    pub pending_rental: Option<PendingRentalWarning>,
}

fn ensure_not_past(start_at: DateTime<Utc>, now: DateTime<Utc>) -> ResultEngine<()> {
    if start_at < now {
        return Err(EngineError::InvalidSchedule(format!(
            "{start_at} is in the past"
        )));
    }
    Ok(())
}

fn validate_list_filter(filter: &AppointmentListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(EngineError::InvalidSchedule(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    if filter.statuses.as_ref().is_some_and(|s| s.is_empty()) {
        return Err(EngineError::InvalidSchedule(
            "statuses must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Check that `[start_at, end_at)` fits the calendar of `professional` and
    /// is free, ignoring `exclude`.
    async fn ensure_bookable<C: ConnectionTrait>(
        &self,
        db: &C,
        professional: &Professional,
        date: NaiveDate,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> ResultEngine<()> {
        let day = working_day(professional, date, self.timezone)?;
        if !day.covers(start_at, end_at) {
            return Err(EngineError::InvalidSchedule(format!(
                "{start_at} - {end_at} is outside the working hours of professional {}",
                professional.id
            )));
        }
        let bookings = self.blocking_bookings(db, professional.id, date).await?;
        if let Some(conflict) = first_conflict(start_at, end_at, &bookings, exclude) {
            return Err(EngineError::SlotNoLongerAvailable(format!(
                "{start_at} - {end_at} overlaps appointment {}",
                conflict.appointment_id
            )));
        }
        Ok(())
    }

    async fn save_appointment<C: ConnectionTrait>(
        &self,
        db: &C,
        appointment: &Appointment,
    ) -> ResultEngine<()> {
        let model: appointments::ActiveModel = appointment.into();
        model.update(db).await?;
        Ok(())
    }

    /// Book an appointment.
    ///
    /// With a professional, the slot is re-validated against the calendar and
    /// the existing bookings under the `(professional, date)` lock, inside the
    /// transaction that inserts the row. Losing the race yields
    /// [`EngineError::SlotNoLongerAvailable`].
    ///
    /// Unassigned appointments are not checked against any agenda.
    pub async fn create_appointment(&self, cmd: CreateAppointmentCmd) -> ResultEngine<Appointment> {
        let client_id = cmd.client_id.trim().to_string();
        if client_id.is_empty() {
            return Err(EngineError::InvalidId(
                "client_id must not be empty".to_string(),
            ));
        }
        let now = Utc::now();
        ensure_not_past(cmd.start_at, now)?;
        let status = cmd.status.unwrap_or(self.default_status);
        let date = local_date(self.timezone, cmd.start_at);

        let _guard = match cmd.professional_id {
            Some(professional_id) => Some(
                self.locks
                    .acquire(LockKey::Professional(professional_id, date))
                    .await,
            ),
            None => None,
        };

        with_tx!(self, |db_tx| {
            let service = self.require_service(&db_tx, cmd.service_id).await?;
            let mut appointment = Appointment::new(
                cmd.professional_id,
                client_id,
                service.id,
                date,
                cmd.start_at,
                service.duration_minutes,
                service.price_minor,
                status,
                now,
            )?;
            appointment.notes = normalize_optional_text(cmd.notes.as_deref());
            appointment.created_by = cmd.created_by.clone();
            if let Some(deposit_minor) = cmd.deposit_minor {
                appointment.capture_deposit(deposit_minor)?;
            }

            if let Some(professional_id) = cmd.professional_id {
                let professional = self.require_professional(&db_tx, professional_id).await?;
                self.ensure_bookable(
                    &db_tx,
                    &professional,
                    date,
                    appointment.start_at,
                    appointment.end_at,
                    None,
                )
                .await?;
            }

            let model: appointments::ActiveModel = (&appointment).into();
            model.insert(&db_tx).await?;

            if let Some(mut entry) = dispatch::deposit_captured(&appointment, &service, now)? {
                entry.created_by = appointment.created_by.clone();
                self.emit(&db_tx, &entry).await?;
            }

            tracing::info!(
                id = %appointment.id,
                professional_id = ?appointment.professional_id,
                start_at = %appointment.start_at,
                status = appointment.status.as_str(),
                "appointment created"
            );
            Ok(appointment)
        })
    }

    pub async fn appointment(&self, appointment_id: Uuid) -> ResultEngine<Appointment> {
        with_tx!(self, |db_tx| {
            self.require_appointment(&db_tx, appointment_id).await
        })
    }

    /// List appointments ordered by start.
    pub async fn appointments(&self, filter: &AppointmentListFilter) -> ResultEngine<Vec<Appointment>> {
        validate_list_filter(filter)?;
        with_tx!(self, |db_tx| {
            let mut query = appointments::Entity::find();
            if let Some(professional_id) = filter.professional_id {
                query =
                    query.filter(appointments::Column::ProfessionalId.eq(professional_id.to_string()));
            }
            if let Some(from) = filter.from {
                query = query.filter(appointments::Column::Date.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(appointments::Column::Date.lte(to));
            }
            if let Some(statuses) = &filter.statuses {
                query = query.filter(
                    appointments::Column::Status.is_in(statuses.iter().map(|s| s.as_str())),
                );
            }
            let mut listed = query
                .order_by_asc(appointments::Column::Date)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Appointment::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            listed.sort_by_key(|appt| (appt.start_at, appt.id));
            Ok(listed)
        })
    }

    /// Move an appointment through its status machine.
    ///
    /// Reaching `Completed` fires, in the same transaction:
    /// - the sale (and commission) ledger entries
    /// - the billing of the confirmed rental of the machine of the service,
    ///   or a [`PendingRentalWarning`] when there is no confirmed rental
    pub async fn transition_appointment(
        &self,
        appointment_id: Uuid,
        to: AppointmentStatus,
        operator: Option<&str>,
    ) -> ResultEngine<TransitionOutcome> {
        let _appointment_guard = self.locks.acquire(LockKey::Appointment(appointment_id)).await;

        // The machine lock key needs the service, read before the transaction.
        let (current, service) = {
            let current = self.require_appointment(&self.database, appointment_id).await?;
            let service = self.require_service(&self.database, current.service_id).await?;
            (current, service)
        };
        let machine_key = match (to, service.machine_id) {
            (AppointmentStatus::Completed, Some(machine_id)) => {
                Some(LockKey::Machine(machine_id, current.date))
            }
            _ => None,
        };
        let _machine_guard = match machine_key {
            Some(key) => Some(self.locks.acquire(key).await),
            None => None,
        };

        let now = Utc::now();
        let outcome = with_tx!(self, |db_tx| {
            let mut appointment = self.require_appointment(&db_tx, appointment_id).await?;
            let from = appointment.status;
            appointment.transition(to)?;
            self.save_appointment(&db_tx, &appointment).await?;

            let mut outcome = TransitionOutcome {
                appointment,
                ledger_entry_ids: Vec::new(),
                billed_rental_id: None,
                pending_rental: None,
            };
            if to == AppointmentStatus::Completed {
                self.on_completed(&db_tx, &service, now, operator, &mut outcome)
                    .await?;
            }

            tracing::info!(
                id = %appointment_id,
                from = from.as_str(),
                to = to.as_str(),
                "appointment transitioned"
            );
            Ok::<_, EngineError>(outcome)
        })?;

        if let Some(warning) = &outcome.pending_rental {
            tracing::warn!(
                appointment_id = %warning.appointment_id,
                machine_id = %warning.machine_id,
                date = %warning.date,
                rental_status = ?warning.rental_status,
                "appointment completed without a confirmed rental"
            );
        }
        Ok(outcome)
    }

    async fn on_completed<C: ConnectionTrait>(
        &self,
        db: &C,
        service: &Service,
        now: DateTime<Utc>,
        operator: Option<&str>,
        outcome: &mut TransitionOutcome,
    ) -> ResultEngine<()> {
        let appointment = &outcome.appointment;
        for mut entry in dispatch::appointment_completed(appointment, service, now)? {
            entry.created_by = operator.map(ToString::to_string);
            outcome.ledger_entry_ids.push(self.emit(db, &entry).await?);
        }

        let Some(machine_id) = service.machine_id else {
            return Ok(());
        };
        let rental = self.rental_on(db, machine_id, appointment.date).await?;
        match rental {
            Some(mut rental) if rental.status == RentalStatus::Confirmed => {
                self.bill_rental(db, &mut rental, now, operator).await?;
                outcome.billed_rental_id = Some(rental.id);
            }
            Some(MachineRental {
                status: RentalStatus::Billed,
                ..
            }) => {}
            other => {
                outcome.pending_rental = Some(PendingRentalWarning {
                    appointment_id: appointment.id,
                    machine_id,
                    date: appointment.date,
                    rental_id: other.as_ref().map(|rental| rental.id),
                    rental_status: other.as_ref().map(|rental| rental.status),
                });
            }
        }
        Ok(())
    }

    /// Move an appointment to a new start, keeping its stored length.
    ///
    /// Only pending and confirmed appointments can move. The new slot is
    /// validated like a booking, with the appointment excluded from its own
    /// conflict set. Reminder flags are reset.
    pub async fn reschedule_appointment(&self, cmd: RescheduleCmd) -> ResultEngine<Appointment> {
        let now = Utc::now();
        ensure_not_past(cmd.start_at, now)?;
        let _appointment_guard = self
            .locks
            .acquire(LockKey::Appointment(cmd.appointment_id))
            .await;

        let current = self
            .require_appointment(&self.database, cmd.appointment_id)
            .await?;
        let professional_id = cmd.professional_id.or(current.professional_id);
        let date = local_date(self.timezone, cmd.start_at);
        let _professional_guard = match professional_id {
            Some(professional_id) => Some(
                self.locks
                    .acquire(LockKey::Professional(professional_id, date))
                    .await,
            ),
            None => None,
        };

        with_tx!(self, |db_tx| {
            let mut appointment = self.require_appointment(&db_tx, cmd.appointment_id).await?;
            if !appointment.status.blocks_agenda() {
                return Err(EngineError::InvalidTransition(format!(
                    "appointment {} is {} and cannot be rescheduled",
                    appointment.id,
                    appointment.status.as_str()
                )));
            }

            let length = appointment.length();
            let start_at = cmd.start_at;
            let end_at = start_at + length;
            if let Some(professional_id) = professional_id {
                let professional = self.require_professional(&db_tx, professional_id).await?;
                self.ensure_bookable(
                    &db_tx,
                    &professional,
                    date,
                    start_at,
                    end_at,
                    Some(appointment.id),
                )
                .await?;
            }

            appointment.professional_id = professional_id;
            appointment.date = date;
            appointment.start_at = start_at;
            appointment.end_at = end_at;
            appointment.reminder_24h_sent = false;
            appointment.reminder_2h_sent = false;
            self.save_appointment(&db_tx, &appointment).await?;

            tracing::info!(
                id = %appointment.id,
                professional_id = ?appointment.professional_id,
                start_at = %appointment.start_at,
                "appointment rescheduled"
            );
            Ok(appointment)
        })
    }

    /// Capture a deposit and book it as income.
    pub async fn record_deposit(
        &self,
        appointment_id: Uuid,
        amount_minor: i64,
        operator: Option<&str>,
    ) -> ResultEngine<Appointment> {
        let _guard = self.locks.acquire(LockKey::Appointment(appointment_id)).await;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let mut appointment = self.require_appointment(&db_tx, appointment_id).await?;
            let service = self.require_service(&db_tx, appointment.service_id).await?;
            appointment.capture_deposit(amount_minor)?;
            self.save_appointment(&db_tx, &appointment).await?;

            if let Some(mut entry) = dispatch::deposit_captured(&appointment, &service, now)? {
                entry.created_by = operator.map(ToString::to_string);
                self.emit(&db_tx, &entry).await?;
            }
            tracing::info!(id = %appointment.id, amount_minor, "deposit recorded");
            Ok(appointment)
        })
    }

    /// Settle the payment of a confirmed or completed appointment.
    pub async fn mark_paid(&self, appointment_id: Uuid) -> ResultEngine<Appointment> {
        let _guard = self.locks.acquire(LockKey::Appointment(appointment_id)).await;
        with_tx!(self, |db_tx| {
            let mut appointment = self.require_appointment(&db_tx, appointment_id).await?;
            appointment.mark_paid()?;
            self.save_appointment(&db_tx, &appointment).await?;
            tracing::info!(id = %appointment.id, "appointment paid");
            Ok(appointment)
        })
    }

    /// Live appointments whose `kind` reminder is due at `now` and not sent yet.
    pub async fn appointments_due_for_reminder(
        &self,
        kind: ReminderKind,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<Appointment>> {
        let first_day = local_date(self.timezone, now);
        let last_day = local_date(self.timezone, now + kind.lead());
        let filter = AppointmentListFilter {
            from: Some(first_day),
            to: Some(last_day),
            statuses: Some(AppointmentStatus::BLOCKING.to_vec()),
            ..AppointmentListFilter::default()
        };
        let mut due = self.appointments(&filter).await?;
        due.retain(|appt| appt.needs_reminder(kind, now));
        Ok(due)
    }

    /// Record that the `kind` reminder went out. Setting it twice is a no-op.
    pub async fn mark_reminder_sent(
        &self,
        appointment_id: Uuid,
        kind: ReminderKind,
    ) -> ResultEngine<Appointment> {
        let _guard = self.locks.acquire(LockKey::Appointment(appointment_id)).await;
        with_tx!(self, |db_tx| {
            let mut appointment = self.require_appointment(&db_tx, appointment_id).await?;
            if !appointment.reminder_sent(kind) {
                match kind {
                    ReminderKind::DayBefore => appointment.reminder_24h_sent = true,
                    ReminderKind::HoursBefore => appointment.reminder_2h_sent = true,
                }
                self.save_appointment(&db_tx, &appointment).await?;
            }
            Ok(appointment)
        })
    }
}
