use serde::{Deserialize, Serialize};
use std::fmt;

/// Which console a caller is signed into. The backend issues separate tokens
/// per role and scopes every endpoint by it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
}

impl Role {
    /// Path segment the clinic backend uses for this role (`/api/admin/...`).
    pub fn api_segment(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_segment())
    }
}

/// An authenticated console session. Passed explicitly to every backend call
/// instead of living in process-wide state.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub token: String,
}

impl Session {
    pub fn new(role: Role, token: impl Into<String>) -> Self {
        Self {
            role,
            token: token.into(),
        }
    }

    pub fn admin(token: impl Into<String>) -> Self {
        Self::new(Role::Admin, token)
    }

    pub fn doctor(token: impl Into<String>) -> Self {
        Self::new(Role::Doctor, token)
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// Tokens never end up in logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub role: Role,
    pub token: String,
}
