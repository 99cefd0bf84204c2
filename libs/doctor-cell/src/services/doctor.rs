use reqwest::{
    multipart::{Form, Part},
    Method,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::auth::Session;

use crate::models::{DoctorError, DoctorRecord, NewDoctorRequest, UpdateProfileRequest};

#[derive(Debug, Deserialize)]
struct RosterPayload {
    #[serde(default)]
    doctors: Vec<DoctorRecord>,
}

#[derive(Debug, Deserialize)]
struct ProfilePayload {
    doctor: Option<DoctorRecord>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountPayload {
    #[serde(default)]
    count: u64,
}

pub struct DoctorService {
    backend: BackendClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    pub fn with_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    // ==============================================================================
    // ADMIN: ROSTER MANAGEMENT
    // ==============================================================================

    /// Fetch the full doctor roster (admin scope).
    pub async fn get_all_doctors(&self, session: &Session) -> Result<Vec<DoctorRecord>, DoctorError> {
        debug!("Fetching doctor roster");

        let payload: RosterPayload = self
            .backend
            .request(Method::GET, "/api/admin/all-doctors", Some(session), None)
            .await?;

        info!("Fetched {} doctors", payload.doctors.len());
        Ok(payload.doctors)
    }

    /// Roster filtered by speciality, case-insensitively. `None` or `"All"`
    /// returns everyone.
    pub async fn get_doctors_by_speciality(
        &self,
        session: &Session,
        speciality: Option<&str>,
    ) -> Result<Vec<DoctorRecord>, DoctorError> {
        let doctors = self.get_all_doctors(session).await?;
        Ok(filter_by_speciality(doctors, speciality))
    }

    /// Flip a doctor's availability flag (admin scope).
    pub async fn change_availability(&self, doctor_id: &str, session: &Session) -> Result<String, DoctorError> {
        debug!("Changing availability for doctor: {}", doctor_id);

        let payload: MessagePayload = self
            .backend
            .request(
                Method::POST,
                "/api/admin/change-availability",
                Some(session),
                Some(json!({ "docId": doctor_id })),
            )
            .await?;

        Ok(payload.message.unwrap_or_else(|| "Availability changed".to_string()))
    }

    /// Register a new doctor with their profile picture (admin scope).
    pub async fn add_doctor(&self, request: NewDoctorRequest, session: &Session) -> Result<String, DoctorError> {
        request.validate()?;
        let image = request.image.ok_or_else(|| {
            DoctorError::ValidationError("Please select a doctor's picture.".to_string())
        })?;

        debug!("Adding doctor: {}", request.email);

        let address = serde_json::to_string(&request.address)
            .map_err(|e| DoctorError::ValidationError(e.to_string()))?;
        let image_part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| DoctorError::ValidationError(format!("Invalid image type: {}", e)))?;

        let form = Form::new()
            .part("image", image_part)
            .text("name", request.name)
            .text("email", request.email)
            .text("password", request.password)
            .text("experience", request.experience)
            .text("fees", request.fees.to_string())
            .text("about", request.about)
            .text("speciality", request.speciality)
            .text("degree", request.degree)
            .text("address", address);

        let payload: MessagePayload = self
            .backend
            .request_multipart("/api/admin/add-doctor", session, form)
            .await?;

        Ok(payload.message.unwrap_or_else(|| "Doctor added successfully!".to_string()))
    }

    /// Number of registered patients, shown on the admin dashboard.
    pub async fn get_patients_count(&self, session: &Session) -> Result<u64, DoctorError> {
        let payload: CountPayload = self
            .backend
            .request(Method::GET, "/api/admin/patients-count", Some(session), None)
            .await?;

        Ok(payload.count)
    }

    // ==============================================================================
    // DOCTOR: SELF PROFILE
    // ==============================================================================

    pub async fn get_profile(&self, session: &Session) -> Result<DoctorRecord, DoctorError> {
        debug!("Fetching doctor profile");

        let payload: ProfilePayload = self
            .backend
            .request(Method::GET, "/api/doctor/profile", Some(session), None)
            .await?;

        payload.doctor.ok_or(DoctorError::ProfileMissing)
    }

    pub async fn update_profile(
        &self,
        request: UpdateProfileRequest,
        session: &Session,
    ) -> Result<DoctorRecord, DoctorError> {
        request.validate()?;

        let body = serde_json::to_value(&request).map_err(|e| DoctorError::ValidationError(e.to_string()))?;
        let payload: ProfilePayload = self
            .backend
            .request(Method::PUT, "/api/doctor/profile/update", Some(session), Some(body))
            .await?;

        info!("Doctor profile updated");
        payload.doctor.ok_or(DoctorError::ProfileMissing)
    }

    /// Toggle the signed-in doctor's availability and return the new state.
    pub async fn toggle_availability(
        &self,
        current: &DoctorRecord,
        session: &Session,
    ) -> Result<DoctorRecord, DoctorError> {
        let _: MessagePayload = self
            .backend
            .request(Method::PUT, "/api/doctor/profile/availability", Some(session), Some(json!({})))
            .await?;

        Ok(DoctorRecord {
            available: !current.available,
            ..current.clone()
        })
    }
}

pub fn filter_by_speciality(doctors: Vec<DoctorRecord>, speciality: Option<&str>) -> Vec<DoctorRecord> {
    match speciality.map(str::trim) {
        None | Some("") => doctors,
        Some(s) if s.eq_ignore_ascii_case("all") => doctors,
        Some(s) => doctors.into_iter().filter(|doc| doc.has_speciality(s)).collect(),
    }
}
