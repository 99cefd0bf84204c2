// libs/appointment-cell/src/services/source.rs
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use doctor_cell::models::DoctorRecord;
use doctor_cell::services::DoctorService;
use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::auth::{Role, Session};

use crate::models::{AppointmentError, AppointmentRecord};

/// Everything the console reads from, or writes back to, the clinic backend.
#[async_trait]
pub trait AppointmentSource: Send + Sync {
    /// Appointments visible to the session: all of them for an admin, the
    /// doctor's own for a doctor.
    async fn fetch_appointments(&self, session: &Session) -> Result<Vec<AppointmentRecord>, AppointmentError>;

    async fn fetch_doctor_roster(&self, session: &Session) -> Result<Vec<DoctorRecord>, AppointmentError>;

    async fn fetch_patients_count(&self, session: &Session) -> Result<u64, AppointmentError>;

    async fn fetch_doctor_profile(&self, session: &Session) -> Result<DoctorRecord, AppointmentError>;

    async fn mark_completed(&self, appointment_id: &str, session: &Session) -> Result<(), AppointmentError>;
}

#[derive(Debug, Deserialize)]
struct AppointmentsPayload {
    #[serde(default)]
    appointments: Vec<AppointmentRecord>,
}

#[derive(Debug, Deserialize)]
struct AckPayload {
    #[serde(default)]
    message: Option<String>,
}

pub struct BackendAppointmentSource {
    backend: BackendClient,
    doctors: DoctorService,
}

impl BackendAppointmentSource {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(BackendClient::new(config))
    }

    pub fn with_client(backend: BackendClient) -> Self {
        Self {
            doctors: DoctorService::with_client(backend.clone()),
            backend,
        }
    }

    fn require_role(session: &Session, role: Role) -> Result<(), AppointmentError> {
        if session.role == role {
            Ok(())
        } else {
            Err(AppointmentError::WrongRole(role))
        }
    }
}

#[async_trait]
impl AppointmentSource for BackendAppointmentSource {
    async fn fetch_appointments(&self, session: &Session) -> Result<Vec<AppointmentRecord>, AppointmentError> {
        let path = format!("/api/{}/appointments", session.role.api_segment());
        debug!("Fetching appointments for {} console", session.role);

        let payload: AppointmentsPayload = self
            .backend
            .request(Method::GET, &path, Some(session), None)
            .await?;

        info!("Fetched {} appointments", payload.appointments.len());
        Ok(payload.appointments)
    }

    async fn fetch_doctor_roster(&self, session: &Session) -> Result<Vec<DoctorRecord>, AppointmentError> {
        Self::require_role(session, Role::Admin)?;
        Ok(self.doctors.get_all_doctors(session).await?)
    }

    async fn fetch_patients_count(&self, session: &Session) -> Result<u64, AppointmentError> {
        Self::require_role(session, Role::Admin)?;
        Ok(self.doctors.get_patients_count(session).await?)
    }

    async fn fetch_doctor_profile(&self, session: &Session) -> Result<DoctorRecord, AppointmentError> {
        Self::require_role(session, Role::Doctor)?;
        Ok(self.doctors.get_profile(session).await?)
    }

    async fn mark_completed(&self, appointment_id: &str, session: &Session) -> Result<(), AppointmentError> {
        Self::require_role(session, Role::Doctor)?;
        debug!("Marking appointment {} completed", appointment_id);

        let ack: AckPayload = self
            .backend
            .request(
                Method::POST,
                "/api/doctor/complete-appointment",
                Some(session),
                Some(json!({ "appointmentId": appointment_id })),
            )
            .await?;

        info!(
            "Appointment {} completed: {}",
            appointment_id,
            ack.message.as_deref().unwrap_or("ok")
        );
        Ok(())
    }
}
