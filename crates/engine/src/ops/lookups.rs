use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    Appointment, AppointmentStatus, Booking, EngineError, Machine, MachineRental, Professional,
    ResultEngine, Service, appointments, machines, professionals, rentals, services,
};

use super::Engine;

/// Generates a `require_*` method loading one row by id into its domain type.
macro_rules! impl_require {
    ($require_fn:ident, $entity:path, $domain:ty, $label:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
        ) -> ResultEngine<$domain> {
            let model = <$entity>::find_by_id(id.to_string())
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("{} {id}", $label)))?;
            <$domain>::try_from(model)
        }
    };
}

impl Engine {
    impl_require!(
        require_professional,
        professionals::Entity,
        Professional,
        "professional"
    );
    impl_require!(require_service, services::Entity, Service, "service");
    impl_require!(require_machine, machines::Entity, Machine, "machine");
    impl_require!(
        require_appointment,
        appointments::Entity,
        Appointment,
        "appointment"
    );
    impl_require!(require_rental, rentals::Entity, MachineRental, "rental");

    /// Appointments occupying the agenda of `professional_id` on `date`.
    pub(super) async fn blocking_bookings<C: ConnectionTrait>(
        &self,
        db: &C,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<Vec<Booking>> {
        let models = appointments::Entity::find()
            .filter(appointments::Column::ProfessionalId.eq(professional_id.to_string()))
            .filter(appointments::Column::Date.eq(date))
            .filter(
                appointments::Column::Status
                    .is_in(AppointmentStatus::BLOCKING.map(|status| status.as_str())),
            )
            .all(db)
            .await?;
        models
            .into_iter()
            .map(|model| Appointment::try_from(model).map(|appt| appt.booking()))
            .collect()
    }

    /// The rental of `machine_id` on `date`, if one was ever scheduled.
    pub(super) async fn rental_on<C: ConnectionTrait>(
        &self,
        db: &C,
        machine_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<Option<MachineRental>> {
        rentals::Entity::find()
            .filter(rentals::Column::MachineId.eq(machine_id.to_string()))
            .filter(rentals::Column::Date.eq(date))
            .one(db)
            .await?
            .map(MachineRental::try_from)
            .transpose()
    }

    /// Map every service that needs a machine to that machine.
    pub(super) async fn machine_services<C: ConnectionTrait>(
        &self,
        db: &C,
        machine_id: Option<Uuid>,
    ) -> ResultEngine<HashMap<String, Uuid>> {
        let mut query = services::Entity::find().filter(services::Column::MachineId.is_not_null());
        if let Some(machine_id) = machine_id {
            query = query.filter(services::Column::MachineId.eq(machine_id.to_string()));
        }
        let mut by_service = HashMap::new();
        for model in query.all(db).await? {
            let service = Service::try_from(model)?;
            if let Some(machine_id) = service.machine_id {
                by_service.insert(service.id.to_string(), machine_id);
            }
        }
        Ok(by_service)
    }
}
