// libs/appointment-cell/src/services/appointments.rs
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use doctor_cell::models::DoctorRecord;
use shared_config::AppConfig;
use shared_models::auth::{Role, Session};

use crate::models::AppointmentError;
use crate::services::board::AppointmentBoard;
use crate::services::classifier::ClassifiedAppointments;
use crate::services::clock::Clock;
use crate::services::source::{AppointmentSource, BackendAppointmentSource};
use crate::services::stats::{compute_stats_with_limit, doctor_overview, DashboardStats, DoctorOverview};

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub total_patients: u64,
    pub doctors: Vec<DoctorRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDashboard {
    #[serde(flatten)]
    pub overview: DoctorOverview,
    pub doctor: DoctorRecord,
}

pub struct AppointmentService {
    source: Arc<dyn AppointmentSource>,
    clock: Arc<dyn Clock>,
    horizon_days: u32,
    recent_limit: usize,
}

impl AppointmentService {
    pub fn new(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_source(Arc::new(BackendAppointmentSource::new(config)), clock, config)
    }

    pub fn with_source(source: Arc<dyn AppointmentSource>, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        Self {
            source,
            clock,
            horizon_days: config.upcoming_horizon_days,
            recent_limit: config.recent_appointments_limit,
        }
    }

    pub async fn board(&self, session: &Session) -> Result<AppointmentBoard, AppointmentError> {
        let now = self.clock.now()?;
        AppointmentBoard::load(self.source.as_ref(), session.clone(), now, self.horizon_days).await
    }

    /// Classified list for whichever console the session belongs to.
    pub async fn classified_view(&self, session: &Session) -> Result<ClassifiedAppointments, AppointmentError> {
        Ok(self.board(session).await?.into_view())
    }

    /// Mark an appointment completed and return the rebuilt doctor view.
    pub async fn complete_appointment(
        &self,
        session: &Session,
        appointment_id: &str,
    ) -> Result<ClassifiedAppointments, AppointmentError> {
        if session.role != Role::Doctor {
            return Err(AppointmentError::WrongRole(Role::Doctor));
        }

        let mut board = self.board(session).await?;
        board.complete(self.source.as_ref(), appointment_id, self.clock.now()?).await?;
        Ok(board.into_view())
    }

    pub async fn admin_dashboard(&self, session: &Session) -> Result<AdminDashboard, AppointmentError> {
        debug!("Building admin dashboard");
        let now = self.clock.now()?;

        let (records, doctors, total_patients) = tokio::try_join!(
            self.source.fetch_appointments(session),
            self.source.fetch_doctor_roster(session),
            self.source.fetch_patients_count(session),
        )?;

        let stats = compute_stats_with_limit(&records, Some(doctors.as_slice()), now, self.recent_limit)?;

        Ok(AdminDashboard {
            stats,
            total_patients,
            doctors,
        })
    }

    pub async fn doctor_dashboard(&self, session: &Session) -> Result<DoctorDashboard, AppointmentError> {
        debug!("Building doctor dashboard");
        let now = self.clock.now()?;

        let (records, doctor) = tokio::try_join!(
            self.source.fetch_appointments(session),
            self.source.fetch_doctor_profile(session),
        )?;

        Ok(DoctorDashboard {
            overview: doctor_overview(&records, now),
            doctor,
        })
    }
}
