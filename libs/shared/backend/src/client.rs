use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    multipart::Form,
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use shared_config::AppConfig;
use shared_models::auth::{LoginRequest, Role, Session};

use crate::error::{BackendError, SESSION_EXPIRED_MESSAGES};

/// HTTP client for the remote clinic backend.
///
/// Every backend response is an envelope `{ "success": bool, "message": ..., ...payload }`.
/// `request` unwraps it: a non-2xx status or `success: false` becomes a
/// [`BackendError`], otherwise the whole body is decoded into `T`, so callers
/// describe only the payload fields they need.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    token: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.backend_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build tuned HTTP client ({}), using defaults", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_headers(&self, session: Option<&Session>) -> Result<HeaderMap, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(session) = session {
            let value = HeaderValue::from_str(&session.bearer())
                .map_err(|_| BackendError::Unauthorized("Malformed session token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        session: Option<&Session>,
        body: Option<Value>,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        if self.base_url.is_empty() {
            return Err(BackendError::NotConfigured);
        }

        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.get_headers(session)?);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;
        Self::unwrap_envelope(response).await
    }

    /// Multipart variant used for uploads; reqwest sets the content type and
    /// boundary itself, so only the bearer header is attached.
    pub async fn request_multipart<T>(
        &self,
        path: &str,
        session: &Session,
        form: Form,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        if self.base_url.is_empty() {
            return Err(BackendError::NotConfigured);
        }

        let url = format!("{}{}", self.base_url, path);
        debug!("Making multipart POST request to {}", url);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, session.bearer())
            .multipart(form)
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    async fn unwrap_envelope<T>(response: Response) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);

        if !status.is_success() {
            let message = message.unwrap_or(text);
            error!("Backend error ({}): {}", status, message);

            return Err(match status.as_u16() {
                401 | 403 => BackendError::Unauthorized(message),
                code => BackendError::Server {
                    status: code,
                    message,
                },
            });
        }

        if body.get("success").and_then(Value::as_bool) != Some(true) {
            let message = message.unwrap_or_else(|| "Request failed".to_string());
            warn!("Backend rejected request: {}", message);

            if SESSION_EXPIRED_MESSAGES.contains(&message.as_str()) {
                return Err(BackendError::Unauthorized(message));
            }
            return Err(BackendError::Rejected(message));
        }

        serde_json::from_value(body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Exchange credentials for a role-scoped token.
    pub async fn login(&self, role: Role, credentials: &LoginRequest) -> Result<Session, BackendError> {
        let path = format!("/api/{}/login", role.api_segment());

        let payload: TokenPayload = self
            .request(
                Method::POST,
                &path,
                None,
                Some(json!({
                    "email": credentials.email,
                    "password": credentials.password,
                })),
            )
            .await?;

        Ok(Session::new(role, payload.token))
    }
}
