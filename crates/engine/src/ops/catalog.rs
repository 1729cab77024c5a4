//! Master data: professionals, services and machines.
//!
//! Owned by an external CRUD in production; these operations cover lookups
//! and the bootstrap used by the admin CLI and the tests.

use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Machine, NewProfessionalCmd, NewServiceCmd, Professional, ResultEngine, Service, machines,
    professionals, services, util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn new_professional(&self, cmd: NewProfessionalCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "professional")?;
        let professional = Professional::new(
            name,
            cmd.working_days,
            cmd.work_start,
            cmd.work_end,
            cmd.slot_interval,
        )?;
        with_tx!(self, |db_tx| {
            let model: professionals::ActiveModel = (&professional).into();
            model.insert(&db_tx).await?;
            tracing::info!(id = %professional.id, name = %professional.name, "professional created");
            Ok(professional.id)
        })
    }

    pub async fn new_machine(&self, name: &str, daily_cost_minor: i64) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "machine")?;
        let machine = Machine::new(name, daily_cost_minor)?;
        with_tx!(self, |db_tx| {
            let model: machines::ActiveModel = (&machine).into();
            model.insert(&db_tx).await?;
            tracing::info!(id = %machine.id, name = %machine.name, "machine created");
            Ok(machine.id)
        })
    }

    /// Add a service. A linked machine must exist.
    pub async fn new_service(&self, cmd: NewServiceCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "service")?;
        let service = Service::new(
            name,
            cmd.duration_minutes,
            cmd.price_minor,
            cmd.machine_id,
            cmd.commission_bps,
        )?;
        with_tx!(self, |db_tx| {
            if let Some(machine_id) = service.machine_id {
                self.require_machine(&db_tx, machine_id).await?;
            }
            let model: services::ActiveModel = (&service).into();
            model.insert(&db_tx).await?;
            tracing::info!(id = %service.id, name = %service.name, "service created");
            Ok(service.id)
        })
    }

    pub async fn professional(&self, professional_id: Uuid) -> ResultEngine<Professional> {
        with_tx!(self, |db_tx| {
            self.require_professional(&db_tx, professional_id).await
        })
    }

    pub async fn service(&self, service_id: Uuid) -> ResultEngine<Service> {
        with_tx!(self, |db_tx| self.require_service(&db_tx, service_id).await)
    }

    pub async fn machine(&self, machine_id: Uuid) -> ResultEngine<Machine> {
        with_tx!(self, |db_tx| self.require_machine(&db_tx, machine_id).await)
    }

    pub async fn professionals(&self) -> ResultEngine<Vec<Professional>> {
        with_tx!(self, |db_tx| {
            professionals::Entity::find()
                .order_by_asc(professionals::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Professional::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn services(&self) -> ResultEngine<Vec<Service>> {
        with_tx!(self, |db_tx| {
            services::Entity::find()
                .order_by_asc(services::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Service::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn machines(&self) -> ResultEngine<Vec<Machine>> {
        with_tx!(self, |db_tx| {
            machines::Entity::find()
                .order_by_asc(machines::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Machine::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
