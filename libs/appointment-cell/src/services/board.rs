// libs/appointment-cell/src/services/board.rs
use chrono::NaiveDateTime;
use tracing::{info, warn};

use shared_models::auth::Session;

use crate::models::{AppointmentError, AppointmentRecord};
use crate::services::classifier::{classify_with_horizon, ClassifiedAppointments, ViewRole};
use crate::services::source::AppointmentSource;

/// The appointment list one console is looking at: the last fetched records
/// and the view derived from them. Every change rebuilds the view from the
/// records rather than patching buckets in place.
#[derive(Debug, Clone)]
pub struct AppointmentBoard {
    session: Session,
    horizon_days: u32,
    records: Vec<AppointmentRecord>,
    view: ClassifiedAppointments,
}

impl AppointmentBoard {
    pub async fn load(
        source: &dyn AppointmentSource,
        session: Session,
        now: NaiveDateTime,
        horizon_days: u32,
    ) -> Result<Self, AppointmentError> {
        let records = source.fetch_appointments(&session).await?;
        let view = classify_with_horizon(&records, now, ViewRole::from(session.role), horizon_days)?;

        Ok(Self {
            session,
            horizon_days,
            records,
            view,
        })
    }

    /// Replace the records with a fresh fetch.
    pub async fn refresh(&mut self, source: &dyn AppointmentSource, now: NaiveDateTime) -> Result<(), AppointmentError> {
        self.records = source.fetch_appointments(&self.session).await?;
        self.reclassify(now)
    }

    /// Ask the backend to complete an appointment, then flip the local flag
    /// and rebuild the view. Nothing changes locally if the backend refuses.
    pub async fn complete(
        &mut self,
        source: &dyn AppointmentSource,
        appointment_id: &str,
        now: NaiveDateTime,
    ) -> Result<(), AppointmentError> {
        let Some(index) = self.records.iter().position(|r| r.id == appointment_id) else {
            warn!("Completion requested for unknown appointment {}", appointment_id);
            return Err(AppointmentError::NotFound(appointment_id.to_string()));
        };

        source.mark_completed(appointment_id, &self.session).await?;

        self.records[index].is_completed = true;
        info!("Appointment {} marked completed", appointment_id);
        self.reclassify(now)
    }

    fn reclassify(&mut self, now: NaiveDateTime) -> Result<(), AppointmentError> {
        self.view = classify_with_horizon(
            &self.records,
            now,
            ViewRole::from(self.session.role),
            self.horizon_days,
        )?;
        Ok(())
    }

    pub fn records(&self) -> &[AppointmentRecord] {
        &self.records
    }

    pub fn view(&self) -> &ClassifiedAppointments {
        &self.view
    }

    pub fn into_view(self) -> ClassifiedAppointments {
        self.view
    }
}
