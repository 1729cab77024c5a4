use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Appointment, AppointmentStatus, EngineError, Machine, MachineRental, RentalStatus,
    ResultEngine, ScheduleRentalCmd, UpdateRentalCmd, appointments, dispatch,
    locks::LockKey,
    machines, rentals,
    util::{is_unique_violation, normalize_optional_text},
};

use super::{Engine, with_tx};

/// Filters for listing rentals. `from` and `to` are inclusive.
#[derive(Clone, Debug, Default)]
pub struct RentalListFilter {
    pub machine_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// A `(machine, date)` with appointments but no confirmed or billed rental.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingRental {
    pub machine_id: Uuid,
    pub machine_name: String,
    pub date: NaiveDate,
    pub appointment_count: u64,
    pub daily_cost_minor: i64,
    pub rental_id: Option<Uuid>,
    pub rental_status: Option<RentalStatus>,
}

/// Appointments counted by the pending rentals report.
const RENTAL_DEMAND: [AppointmentStatus; 3] = [
    AppointmentStatus::Pending,
    AppointmentStatus::Confirmed,
    AppointmentStatus::Completed,
];

impl Engine {
    async fn save_rental<C: ConnectionTrait>(
        &self,
        db: &C,
        rental: &MachineRental,
    ) -> ResultEngine<()> {
        let model: rentals::ActiveModel = rental.into();
        model.update(db).await?;
        Ok(())
    }

    /// Move a confirmed rental to `Billed` and book its expense.
    ///
    /// Callers hold the `(machine, date)` lock.
    pub(super) async fn bill_rental<C: ConnectionTrait>(
        &self,
        db: &C,
        rental: &mut MachineRental,
        now: DateTime<Utc>,
        operator: Option<&str>,
    ) -> ResultEngine<()> {
        let machine = self.require_machine(db, rental.machine_id).await?;
        let expense_id = match dispatch::rental_billed(rental, &machine, now)? {
            Some(mut entry) => {
                entry.created_by = operator.map(ToString::to_string);
                Some(self.emit(db, &entry).await?)
            }
            None => None,
        };
        rental.bill(expense_id)?;
        self.save_rental(db, rental).await?;
        tracing::info!(
            id = %rental.id,
            machine_id = %rental.machine_id,
            date = %rental.date,
            expense_transaction_id = ?rental.expense_transaction_id,
            "rental billed"
        );
        Ok(())
    }

    /// Number of completed appointments using `machine_id` on `date`.
    async fn completed_uses<C: ConnectionTrait>(
        &self,
        db: &C,
        machine_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<u64> {
        let service_ids: Vec<String> = self
            .machine_services(db, Some(machine_id))
            .await?
            .into_keys()
            .collect();
        if service_ids.is_empty() {
            return Ok(0);
        }
        let count = appointments::Entity::find()
            .filter(appointments::Column::ServiceId.is_in(service_ids))
            .filter(appointments::Column::Date.eq(date))
            .filter(appointments::Column::Status.eq(AppointmentStatus::Completed.as_str()))
            .count(db)
            .await?;
        Ok(count)
    }

    /// Reserve a machine for a date. One rental exists per `(machine, date)`.
    pub async fn schedule_rental(&self, cmd: ScheduleRentalCmd) -> ResultEngine<MachineRental> {
        let _guard = self
            .locks
            .acquire(LockKey::Machine(cmd.machine_id, cmd.date))
            .await;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let machine = self.require_machine(&db_tx, cmd.machine_id).await?;
            if let Some(existing) = self.rental_on(&db_tx, machine.id, cmd.date).await? {
                return Err(EngineError::ExistingKey(format!(
                    "rental {} of machine {} on {}",
                    existing.id, machine.id, cmd.date
                )));
            }

            let rental = MachineRental::new(
                machine.id,
                cmd.date,
                cmd.cost_minor.unwrap_or(machine.daily_cost_minor),
                normalize_optional_text(cmd.notes.as_deref()),
                now,
            )?;
            let model: rentals::ActiveModel = (&rental).into();
            model.insert(&db_tx).await.map_err(|err| {
                if is_unique_violation(&err) {
                    EngineError::ExistingKey(format!(
                        "rental of machine {} on {}",
                        machine.id, cmd.date
                    ))
                } else {
                    err.into()
                }
            })?;

            tracing::info!(
                id = %rental.id,
                machine_id = %rental.machine_id,
                date = %rental.date,
                cost_minor = rental.cost_minor,
                "rental scheduled"
            );
            Ok(rental)
        })
    }

    /// Load a rental and take the lock of its `(machine, date)`.
    async fn lock_rental(
        &self,
        rental_id: Uuid,
    ) -> ResultEngine<tokio::sync::OwnedMutexGuard<()>> {
        let rental = self.require_rental(&self.database, rental_id).await?;
        Ok(self
            .locks
            .acquire(LockKey::Machine(rental.machine_id, rental.date))
            .await)
    }

    /// Confirm a scheduled rental.
    ///
    /// When appointments using the machine on that date were already
    /// completed, the rental is billed right away.
    pub async fn confirm_rental(
        &self,
        rental_id: Uuid,
        operator: Option<&str>,
    ) -> ResultEngine<MachineRental> {
        let _guard = self.lock_rental(rental_id).await?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let mut rental = self.require_rental(&db_tx, rental_id).await?;
            rental.confirm()?;
            self.save_rental(&db_tx, &rental).await?;
            tracing::info!(id = %rental.id, "rental confirmed");

            let completed = self
                .completed_uses(&db_tx, rental.machine_id, rental.date)
                .await?;
            if completed > 0 {
                self.bill_rental(&db_tx, &mut rental, now, operator).await?;
            }
            Ok(rental)
        })
    }

    pub async fn cancel_rental(&self, rental_id: Uuid) -> ResultEngine<MachineRental> {
        let _guard = self.lock_rental(rental_id).await?;
        with_tx!(self, |db_tx| {
            let mut rental = self.require_rental(&db_tx, rental_id).await?;
            rental.cancel()?;
            self.save_rental(&db_tx, &rental).await?;
            tracing::info!(id = %rental.id, "rental cancelled");
            Ok(rental)
        })
    }

    pub async fn update_rental(
        &self,
        rental_id: Uuid,
        cmd: UpdateRentalCmd,
    ) -> ResultEngine<MachineRental> {
        let _guard = self.lock_rental(rental_id).await?;
        let notes = cmd
            .notes
            .map(|notes| normalize_optional_text(notes.as_deref()));
        with_tx!(self, |db_tx| {
            let mut rental = self.require_rental(&db_tx, rental_id).await?;
            rental.update(cmd.cost_minor, notes)?;
            self.save_rental(&db_tx, &rental).await?;
            tracing::info!(id = %rental.id, "rental updated");
            Ok(rental)
        })
    }

    pub async fn rental(&self, rental_id: Uuid) -> ResultEngine<MachineRental> {
        with_tx!(self, |db_tx| self.require_rental(&db_tx, rental_id).await)
    }

    /// List rentals ordered by date.
    pub async fn rentals(&self, filter: &RentalListFilter) -> ResultEngine<Vec<MachineRental>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to)
            && from > to
        {
            return Err(EngineError::InvalidSchedule(
                "invalid range: from must be <= to".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let mut query = rentals::Entity::find();
            if let Some(machine_id) = filter.machine_id {
                query = query.filter(rentals::Column::MachineId.eq(machine_id.to_string()));
            }
            if let Some(from) = filter.from {
                query = query.filter(rentals::Column::Date.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(rentals::Column::Date.lte(to));
            }
            query
                .order_by_asc(rentals::Column::Date)
                .order_by_asc(rentals::Column::MachineId)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(MachineRental::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Machine days with demand and no confirmed or billed rental.
    ///
    /// Groups appointments (pending, confirmed or completed) of services that
    /// need a machine by `(machine, date)`, starting at `from` when given.
    /// Ordered by date, then machine id.
    pub async fn pending_rentals(&self, from: Option<NaiveDate>) -> ResultEngine<Vec<PendingRental>> {
        with_tx!(self, |db_tx| {
            let machine_of_service = self.machine_services(&db_tx, None).await?;
            if machine_of_service.is_empty() {
                return Ok(Vec::new());
            }

            let mut query = appointments::Entity::find()
                .filter(
                    appointments::Column::ServiceId
                        .is_in(machine_of_service.keys().cloned().collect::<Vec<_>>()),
                )
                .filter(
                    appointments::Column::Status
                        .is_in(RENTAL_DEMAND.map(|status| status.as_str())),
                );
            if let Some(from) = from {
                query = query.filter(appointments::Column::Date.gte(from));
            }

            let mut demand: BTreeMap<(NaiveDate, String), (Uuid, u64)> = BTreeMap::new();
            for model in query.all(&db_tx).await? {
                let appointment = Appointment::try_from(model)?;
                let Some(machine_id) = machine_of_service
                    .get(&appointment.service_id.to_string())
                    .copied()
                else {
                    continue;
                };
                demand
                    .entry((appointment.date, machine_id.to_string()))
                    .or_insert((machine_id, 0))
                    .1 += 1;
            }
            if demand.is_empty() {
                return Ok(Vec::new());
            }

            let machine_ids: Vec<String> = demand
                .values()
                .map(|(machine_id, _)| machine_id.to_string())
                .collect();
            let mut rentals_query =
                rentals::Entity::find().filter(rentals::Column::MachineId.is_in(machine_ids.clone()));
            if let Some(from) = from {
                rentals_query = rentals_query.filter(rentals::Column::Date.gte(from));
            }
            let mut rental_of_day: HashMap<(Uuid, NaiveDate), MachineRental> = HashMap::new();
            for model in rentals_query.all(&db_tx).await? {
                let rental = MachineRental::try_from(model)?;
                rental_of_day.insert((rental.machine_id, rental.date), rental);
            }

            let mut machine_by_id: HashMap<Uuid, Machine> = HashMap::new();
            for model in machines::Entity::find()
                .filter(machines::Column::Id.is_in(machine_ids))
                .all(&db_tx)
                .await?
            {
                let machine = Machine::try_from(model)?;
                machine_by_id.insert(machine.id, machine);
            }

            let mut pending = Vec::new();
            for ((date, _), (machine_id, appointment_count)) in demand {
                let rental = rental_of_day.get(&(machine_id, date));
                if !RentalStatus::needs_confirmation(rental.map(|rental| rental.status)) {
                    continue;
                }
                let machine = machine_by_id
                    .get(&machine_id)
                    .ok_or_else(|| EngineError::KeyNotFound(format!("machine {machine_id}")))?;
                pending.push(PendingRental {
                    machine_id,
                    machine_name: machine.name.clone(),
                    date,
                    appointment_count,
                    daily_cost_minor: machine.daily_cost_minor,
                    rental_id: rental.map(|rental| rental.id),
                    rental_status: rental.map(|rental| rental.status),
                });
            }
            Ok(pending)
        })
    }
}
