use chrono::NaiveDate;
use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{ResultEngine, Slot, SlotGenerator, available_slots, working_day};

use super::{Engine, with_tx};

impl Engine {
    /// Free slots of `professional_id` on `date` for one `service_id`.
    ///
    /// Candidates come from the working calendar of the professional, stepped
    /// by their slot interval, and are dropped when they overlap a pending or
    /// confirmed appointment. Pass `exclude_appointment_id` when rescheduling
    /// so the appointment does not block its own slots.
    ///
    /// An empty result is a valid answer (day off or fully booked).
    pub async fn available_slots(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        service_id: Uuid,
        exclude_appointment_id: Option<Uuid>,
    ) -> ResultEngine<Vec<Slot>> {
        with_tx!(self, |db_tx| {
            let professional = self.require_professional(&db_tx, professional_id).await?;
            let service = self.require_service(&db_tx, service_id).await?;

            let day = working_day(&professional, date, self.timezone)?;
            if !day.is_working() {
                return Ok(Vec::new());
            }
            let bookings = self.blocking_bookings(&db_tx, professional_id, date).await?;
            let candidates = SlotGenerator::new(&day, service.duration_minutes);
            Ok(available_slots(candidates, &bookings, exclude_appointment_id))
        })
    }
}
