use std::sync::Arc;

use axum::extract::{Json, State};
use tracing::{debug, info};

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::auth::{LoginRequest, LoginResponse, Role};
use shared_models::error::AppError;

fn validate_credentials(credentials: &LoginRequest) -> Result<(), AppError> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::ValidationError(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

async fn login(config: &AppConfig, role: Role, credentials: LoginRequest) -> Result<Json<LoginResponse>, AppError> {
    validate_credentials(&credentials)?;
    debug!("{} login attempt for {}", role, credentials.email);

    let backend = BackendClient::new(config);
    let session = backend.login(role, &credentials).await?;

    info!("{} signed in", role);

    Ok(Json(LoginResponse {
        role: session.role,
        token: session.token,
    }))
}

#[axum::debug_handler]
pub async fn admin_login(
    State(config): State<Arc<AppConfig>>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    login(&config, Role::Admin, credentials).await
}

#[axum::debug_handler]
pub async fn doctor_login(
    State(config): State<Arc<AppConfig>>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    login(&config, Role::Doctor, credentials).await
}
