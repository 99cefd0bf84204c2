use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware,
};

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::extractor::session_middleware;

use crate::handlers;

/// Roster management, mounted under `/admin/doctors`.
pub fn admin_doctor_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::list_doctors).post(handlers::add_doctor))
        .route("/{doctor_id}/availability", post(handlers::change_availability))
        .layer(middleware::from_fn_with_state(Role::Admin, session_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}

/// The signed-in doctor's own profile, mounted under `/doctor/profile`.
pub fn doctor_profile_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::get_profile).put(handlers::update_profile))
        .route("/availability", put(handlers::toggle_availability))
        .layer(middleware::from_fn_with_state(Role::Doctor, session_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
