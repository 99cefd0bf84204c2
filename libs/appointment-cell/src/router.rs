use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::extractor::session_middleware;

use crate::handlers;
use crate::services::clock::{Clock, SystemClock};

/// Shared by the appointment handlers: backend config plus the clock that
/// supplies "now" for every classification.
#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
}

impl AppointmentState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Arc<AppConfig>, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }
}

/// Admin console views, mounted under `/admin`.
pub fn admin_appointment_routes(state: AppointmentState) -> Router {
    let protected_routes = Router::new()
        .route("/appointments", get(handlers::admin_appointments))
        .route("/dashboard", get(handlers::admin_dashboard))
        .layer(middleware::from_fn_with_state(Role::Admin, session_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}

/// Doctor console views, mounted under `/doctor`.
pub fn doctor_appointment_routes(state: AppointmentState) -> Router {
    let protected_routes = Router::new()
        .route("/appointments", get(handlers::doctor_appointments))
        .route("/appointments/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/dashboard", get(handlers::doctor_dashboard))
        .layer(middleware::from_fn_with_state(Role::Doctor, session_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
