use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;

use crate::models::{DoctorAddress, NewDoctorRequest, ProfileImage, UpdateProfileRequest};
use crate::services::doctor::DoctorService;

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub speciality: Option<String>,
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<RosterQuery>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service
        .get_doctors_by_speciality(&session, query.speciality.as_deref())
        .await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len(),
    })))
}

#[axum::debug_handler]
pub async fn change_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let message = doctor_service.change_availability(&doctor_id, &session).await?;
    let doctors = doctor_service.get_all_doctors(&session).await?;

    Ok(Json(json!({
        "message": message,
        "doctors": doctors,
    })))
}

#[axum::debug_handler]
pub async fn add_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = read_new_doctor(multipart).await?;
    let doctor_service = DoctorService::new(&state);

    let message = doctor_service.add_doctor(request, &session).await?;

    Ok((StatusCode::CREATED, Json(json!({ "message": message }))))
}

async fn read_new_doctor(mut multipart: Multipart) -> Result<NewDoctorRequest, AppError> {
    let mut request = NewDoctorRequest {
        name: String::new(),
        email: String::new(),
        password: String::new(),
        experience: String::new(),
        fees: 0.0,
        about: String::new(),
        speciality: String::new(),
        degree: String::new(),
        address: DoctorAddress::default(),
        image: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let file_name = field.file_name().unwrap_or("doctor.png").to_string();
            let content_type = field.content_type().unwrap_or("image/png").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;
            request.image = Some(ProfileImage {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;

        match name.as_str() {
            "name" => request.name = text,
            "email" => request.email = text,
            "password" => request.password = text,
            "experience" => request.experience = text,
            "fees" => {
                request.fees = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::ValidationError("Fees must be a positive number.".to_string()))?
            }
            "about" => request.about = text,
            "speciality" => request.speciality = text,
            "degree" => request.degree = text,
            "address" => {
                request.address = serde_json::from_str(&text)
                    .map_err(|_| AppError::ValidationError("Address must be a JSON object".to_string()))?
            }
            "address1" | "line1" => request.address.line1 = text,
            "address2" | "line2" => request.address.line2 = text,
            other => debug!("Ignoring unknown add-doctor field: {}", other),
        }
    }

    Ok(request)
}

// ==============================================================================
// DOCTOR SELF-SERVICE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.get_profile(&session).await?;

    Ok(Json(json!({ "doctor": doctor })))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.update_profile(request, &session).await?;

    Ok(Json(json!({
        "message": "Profile updated",
        "doctor": doctor,
    })))
}

#[axum::debug_handler]
pub async fn toggle_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let current = doctor_service.get_profile(&session).await?;
    let doctor = doctor_service.toggle_availability(&current, &session).await?;

    Ok(Json(json!({
        "available": doctor.available,
        "doctor": doctor,
    })))
}
