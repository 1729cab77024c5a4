#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    AppointmentStatus, CreateAppointmentCmd, Engine, NewProfessionalCmd, NewServiceCmd,
    SlotInterval, WorkingDays,
};
use migration::MigratorTrait;

/// A salon with one professional working Mon-Fri 09:00-18:00 every 30
/// minutes, a one hour cut, and a laser session needing a rented machine.
pub struct Salon {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub professional_id: Uuid,
    pub cut_id: Uuid,
    pub laser_id: Uuid,
    pub machine_id: Uuid,
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Same as [`engine_with_db`] with `timezone` as business timezone.
pub async fn engine_in(timezone: chrono_tz::Tz) -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .timezone(timezone)
        .build()
        .await
        .unwrap()
}

pub async fn salon() -> Salon {
    let (engine, db) = engine_with_db().await;
    seed(engine, db).await
}

pub async fn seed(engine: Engine, db: DatabaseConnection) -> Salon {
    let professional_id = engine
        .new_professional(NewProfessionalCmd {
            name: "Ana".to_string(),
            working_days: WorkingDays::WEEKDAYS,
            work_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            work_end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            slot_interval: SlotInterval::Minutes30,
        })
        .await
        .unwrap();
    let machine_id = engine.new_machine("Laser X", 30_000).await.unwrap();
    let cut_id = engine
        .new_service(NewServiceCmd::new("Cut", 60, 10_000))
        .await
        .unwrap();
    let laser_id = engine
        .new_service(
            NewServiceCmd::new("Laser session", 60, 50_000)
                .machine_id(machine_id)
                .commission_bps(1_000),
        )
        .await
        .unwrap();
    Salon {
        engine,
        db,
        professional_id,
        cut_id,
        laser_id,
        machine_id,
    }
}

/// Monday 2099-01-05.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 1, 5).unwrap()
}

/// An instant in January 2099 (UTC, which is the business timezone here).
pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 1, day, hour, minute, 0).unwrap()
}

impl Salon {
    pub fn booking(&self, service_id: Uuid, start_at: DateTime<Utc>) -> CreateAppointmentCmd {
        CreateAppointmentCmd::new("client-1", service_id, start_at)
            .professional_id(self.professional_id)
    }

    /// Book `service_id` at `start_at` and move it to `Confirmed`.
    pub async fn confirmed(&self, service_id: Uuid, start_at: DateTime<Utc>) -> Uuid {
        let appointment = self
            .engine
            .create_appointment(self.booking(service_id, start_at))
            .await
            .unwrap();
        self.engine
            .transition_appointment(appointment.id, AppointmentStatus::Confirmed, None)
            .await
            .unwrap();
        appointment.id
    }
}
