// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use shared_models::auth::Session;
use shared_models::error::AppError;

use crate::router::AppointmentState;
use crate::services::appointments::AppointmentService;

fn service(state: &AppointmentState) -> AppointmentService {
    AppointmentService::new(&state.config, state.clock.clone())
}

// ==============================================================================
// ADMIN CONSOLE
// ==============================================================================

#[axum::debug_handler]
pub async fn admin_appointments(
    State(state): State<AppointmentState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointment_service = service(&state);

    let view = appointment_service.classified_view(&session).await?;

    Ok(Json(json!({
        "appointments": view,
        "total": view.placed_count() + view.unparseable.len(),
    })))
}

#[axum::debug_handler]
pub async fn admin_dashboard(
    State(state): State<AppointmentState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointment_service = service(&state);

    let dashboard = appointment_service.admin_dashboard(&session).await?;

    Ok(Json(json!({ "dashboard": dashboard })))
}

// ==============================================================================
// DOCTOR CONSOLE
// ==============================================================================

#[axum::debug_handler]
pub async fn doctor_appointments(
    State(state): State<AppointmentState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointment_service = service(&state);

    let view = appointment_service.classified_view(&session).await?;

    Ok(Json(json!({
        "appointments": view,
        "total": view.placed_count() + view.unparseable.len(),
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<String>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointment_service = service(&state);

    let view = appointment_service
        .complete_appointment(&session, &appointment_id)
        .await?;

    info!("Completed appointment {}", appointment_id);

    Ok(Json(json!({
        "message": "Appointment marked as completed",
        "appointments": view,
    })))
}

#[axum::debug_handler]
pub async fn doctor_dashboard(
    State(state): State<AppointmentState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointment_service = service(&state);

    let dashboard = appointment_service.doctor_dashboard(&session).await?;

    Ok(Json(json!({ "dashboard": dashboard })))
}
