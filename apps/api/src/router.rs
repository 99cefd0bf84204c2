use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::{admin_appointment_routes, doctor_appointment_routes, AppointmentState};
use auth_cell::router::login_routes;
use doctor_cell::router::{admin_doctor_routes, doctor_profile_routes};
use shared_config::AppConfig;
use shared_models::auth::Role;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let appointments = AppointmentState::new(state.clone());

    let admin = Router::new()
        .merge(login_routes(state.clone(), Role::Admin))
        .merge(admin_appointment_routes(appointments.clone()))
        .nest("/doctors", admin_doctor_routes(state.clone()));

    let doctor = Router::new()
        .merge(login_routes(state.clone(), Role::Doctor))
        .merge(doctor_appointment_routes(appointments))
        .nest("/profile", doctor_profile_routes(state));

    Router::new()
        .route("/", get(|| async { "Clinic console API is running!" }))
        .nest("/admin", admin)
        .nest("/doctor", doctor)
}
