use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use http::{header::AUTHORIZATION, HeaderMap};
use tracing::debug;

use shared_models::auth::{Role, Session};
use shared_models::error::AppError;

/// Pull the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    if !headers.contains_key(AUTHORIZATION) {
        return Err(AppError::Auth("Missing authorization header".to_string()));
    }

    let authorization = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = authorization.token().trim();
    if token.is_empty() {
        return Err(AppError::Auth("Empty bearer token".to_string()));
    }

    Ok(token.to_string())
}

// The console does not validate tokens itself; the clinic backend does that on
// every forwarded call. This only turns the header into an explicit Session
// scoped to the role of the router it guards.
pub async fn session_middleware(
    State(role): State<Role>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session = Session::new(role, bearer_token(request.headers())?);
    debug!("Resolved {} session for {}", role, request.uri().path());

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
