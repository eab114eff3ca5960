use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored account record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    /// Fresh per registration; a re-registered username gets a new one.
    pub account_id: String,
    pub created_at: i64, // unix seconds
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: String) -> Self {
        Self {
            username: username.into(),
            password_hash,
            account_id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Token payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // username
    pub exp: i64,
    pub iat: i64,
    /// Account the token was issued for. Absent on tokens not bound to an account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aid: Option<String>,
}

/// Register/login request body. `username` may be absent on the wire; the
/// auth handler rejects that case itself.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: password.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct MeResponse {
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database_url_set: bool,
}
