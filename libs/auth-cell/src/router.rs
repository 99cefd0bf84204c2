use std::sync::Arc;

use axum::{
    Router,
    routing::post,
};

use shared_config::AppConfig;
use shared_models::auth::Role;

use crate::handlers;

/// Public sign-in route for one console, mounted under `/admin` or `/doctor`.
pub fn login_routes(state: Arc<AppConfig>, role: Role) -> Router {
    let handler = match role {
        Role::Admin => post(handlers::admin_login),
        Role::Doctor => post(handlers::doctor_login),
    };

    let public_routes = Router::new().route("/login", handler);

    Router::new()
        .merge(public_routes)
        .with_state(state)
}
