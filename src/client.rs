//! Blocking HTTP client for the auth endpoints, as used by the game and
//! the CLI.

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{Credentials, HealthResponse, MeResponse, MessageResponse, TokenResponse};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}: {detail}")]
    Rejected { status: u16, detail: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

pub struct AuthClient {
    base_url: String,
    http: Client,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn register(&self, username: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let res = self
            .http
            .post(self.url("/auth/register"))
            .json(&Credentials::new(username, password))
            .send()?;
        decode(res)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let res = self
            .http
            .post(self.url("/auth/login"))
            .json(&Credentials::new(username, password))
            .send()?;
        decode(res)
    }

    pub fn me(&self, token: &str) -> Result<MeResponse, ClientError> {
        let res = self.http.get(self.url("/auth/me")).bearer_auth(token).send()?;
        decode(res)
    }

    pub fn delete_profile(&self, token: &str, username: &str) -> Result<MessageResponse, ClientError> {
        let res = self
            .http
            .delete(self.url(&format!("/auth/profile/{username}")))
            .bearer_auth(token)
            .send()?;
        decode(res)
    }

    pub fn health(&self) -> Result<HealthResponse, ClientError> {
        let res = self.http.get(self.url("/health")).send()?;
        decode(res)
    }
}

fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json()?);
    }
    Err(ClientError::Rejected {
        status: status.as_u16(),
        detail: error_detail(status, res),
    })
}

/// Best-effort extraction of `{"detail": ...}` from an error body.
fn error_detail(status: StatusCode, res: Response) -> String {
    let fallback = status.canonical_reason().unwrap_or("error").to_string();
    let Ok(body) = res.text() else {
        return fallback;
    };
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_owned))
        .unwrap_or(if body.is_empty() { fallback } else { body })
}

/// What a login attempt amounted to, from the game's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(String),
    Rejected(u16),
    Unreachable(String),
}

/// Anything the login screen can submit credentials to.
pub trait LoginBackend: Send + Sync {
    fn login(&self, username: &str, password: &str) -> LoginOutcome;
}

impl LoginBackend for AuthClient {
    fn login(&self, username: &str, password: &str) -> LoginOutcome {
        match AuthClient::login(self, username, password) {
            Ok(token) => LoginOutcome::Success(token.access_token),
            Err(ClientError::Rejected { status, .. }) => LoginOutcome::Rejected(status),
            Err(e) => LoginOutcome::Unreachable(e.to_string()),
        }
    }
}
